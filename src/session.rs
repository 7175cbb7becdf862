//! Session store: token bookkeeping and the login/admin/user decision.
//!
//! The store holds the in-memory token, the resolved identity and, after a
//! login, the credentials used for silent token refresh. The persisted token
//! lives in the client's token store; when the two disagree the persisted
//! value wins, since the HTTP client clears it on any 401.
//!
//! Every decision ends in a navigation through the client's navigator.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::client::ApiClient;
use crate::api::response::read_json;
use crate::api::types::{Credentials, LoginResponse, SessionIdentity};
use crate::route::{Navigation, Route};

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No token and nothing to refresh it with.
    Unauthenticated,
    /// No token, but stored credentials can obtain one.
    PendingRefresh,
    /// Token present, identity not yet resolved.
    Authenticated,
    ResolvedAdmin,
    ResolvedUser(String),
}

pub struct SessionStore {
    api: Arc<ApiClient>,
    token: RwLock<Option<String>>,
    identity: RwLock<Option<SessionIdentity>>,
    credentials: RwLock<Option<Credentials>>,
}

impl SessionStore {
    /// Create a store whose initial token is whatever is persisted.
    pub fn new(api: Arc<ApiClient>) -> Self {
        let token = load_persisted(&api);
        if token.is_some() {
            log::info!("Found persisted session token");
        }
        Self {
            api,
            token: RwLock::new(token),
            identity: RwLock::new(None),
            credentials: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> SessionState {
        if self.token.read().await.is_none() {
            return if self.credentials.read().await.is_some() {
                SessionState::PendingRefresh
            } else {
                SessionState::Unauthenticated
            };
        }

        match self.identity.read().await.as_ref() {
            Some(identity) if identity.admin => SessionState::ResolvedAdmin,
            Some(identity) => match identity.user_id() {
                Some(id) => SessionState::ResolvedUser(id.to_string()),
                None => SessionState::Authenticated,
            },
            None => SessionState::Authenticated,
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn identity(&self) -> Option<SessionIdentity> {
        self.identity.read().await.clone()
    }

    pub async fn has_credentials(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Set or clear the token, mirroring it to persistent storage.
    ///
    /// An empty string is treated as no token.
    pub async fn set_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.is_empty());
        let tokens = self.api.token_store();
        let persisted = match &token {
            Some(t) => tokens.store(t),
            None => tokens.clear(),
        };
        if let Err(e) = persisted {
            log::warn!("Failed to persist session token: {}", e);
        }
        *self.token.write().await = token;
    }

    /// Exchange stored credentials for a fresh token.
    ///
    /// Any failure clears the token and discards the credentials. Without
    /// stored credentials this does nothing.
    pub async fn refresh_token(&self) {
        let Some(credentials) = self.credentials.read().await.clone() else {
            return;
        };

        log::info!("Refreshing session token for {}", credentials.username);
        let token = match self.api.post("/login", &credentials).await {
            Ok(resp) => match read_json::<LoginResponse>(resp).await {
                Ok(body) => body.and_then(|b| b.token).filter(|t| !t.is_empty()),
                Err(e) => {
                    log::warn!("Login response could not be decoded: {}", e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Token refresh failed: {}", e);
                None
            }
        };

        match token {
            Some(token) => self.set_token(Some(token)).await,
            None => {
                self.set_token(None).await;
                *self.credentials.write().await = None;
            }
        }
    }

    /// Resolve the current session and navigate to the matching surface.
    ///
    /// Returns the route navigated to.
    pub async fn get_session(&self) -> Route {
        self.reconcile_token().await;

        if self.token.read().await.is_none() && self.credentials.read().await.is_some() {
            self.refresh_token().await;
        }

        if self.token.read().await.is_none() {
            log::info!("No session token, redirecting to login");
            *self.identity.write().await = None;
            return self.go(Route::Login);
        }

        match self.api.get("/auth/session").await {
            Ok(resp) => match read_json::<SessionIdentity>(resp).await {
                Ok(Some(identity)) => self.resolve(identity).await,
                Ok(None) => self.fail_session("empty session response").await,
                Err(e) => self.fail_session(&e.to_string()).await,
            },
            Err(e) => self.fail_session(&e.to_string()).await,
        }
    }

    /// Store credentials and start a fresh session from them.
    pub async fn login(&self, credentials: Credentials) -> Route {
        *self.credentials.write().await = Some(credentials);
        *self.identity.write().await = None;
        self.set_token(None).await;
        self.get_session().await
    }

    /// Clear token, credentials and identity, then go to login.
    pub async fn logout(&self) {
        log::info!("Logging out");
        self.set_token(None).await;
        *self.credentials.write().await = None;
        *self.identity.write().await = None;
        self.api
            .navigator()
            .navigate(Navigation::push(Route::Login));
    }

    async fn reconcile_token(&self) {
        let persisted = load_persisted(&self.api);
        let mut token = self.token.write().await;
        if *token != persisted {
            log::debug!("In-memory token diverged from persisted token, using persisted");
            *token = persisted;
        }
    }

    async fn resolve(&self, identity: SessionIdentity) -> Route {
        let route = if identity.admin {
            Some(Route::Admin)
        } else {
            identity.user_id().map(|id| Route::User { id: id.to_string() })
        };

        match route {
            Some(route) => {
                log::info!(
                    "Session resolved for {} ({})",
                    identity.display_name().unwrap_or("unknown"),
                    route.name()
                );
                *self.identity.write().await = Some(identity);
                self.go(route)
            }
            None => self.fail_session("identity has neither admin flag nor id").await,
        }
    }

    async fn fail_session(&self, reason: &str) -> Route {
        log::warn!("Session could not be resolved: {}", reason);
        self.set_token(None).await;
        *self.identity.write().await = None;
        self.go(Route::Login)
    }

    fn go(&self, route: Route) -> Route {
        self.api
            .navigator()
            .navigate(Navigation::replace(route.clone()));
        route
    }
}

fn load_persisted(api: &ApiClient) -> Option<String> {
    match api.token_store().load() {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            log::warn!("Failed to read persisted token: {}", e);
            None
        }
    }
}
