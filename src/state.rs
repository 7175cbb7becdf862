//! Application state for the file repository client.
//!
//! One explicit context object owns the HTTP client and the session store;
//! every command receives it instead of reaching for globals.

use std::sync::Arc;

use crate::api::auth::{KeychainTokenStore, MemoryTokenStore, TokenStore};
use crate::api::client::ApiClient;
use crate::config::Config;
use crate::route::{HistoryNavigator, Route};
use crate::session::SessionStore;

pub struct AppState {
    pub config: Config,

    /// HTTP client shared with the session store.
    pub api: Arc<ApiClient>,

    pub session: SessionStore,

    /// Every navigation decided during this run.
    pub navigator: Arc<HistoryNavigator>,
}

impl AppState {
    /// Build state with an explicit token store.
    pub fn new(config: Config, tokens: Arc<dyn TokenStore>) -> Self {
        let navigator = Arc::new(HistoryNavigator::new());
        let api = Arc::new(ApiClient::new(&config, tokens, navigator.clone()));
        let session = SessionStore::new(api.clone());
        Self {
            config,
            api,
            session,
            navigator,
        }
    }

    /// State whose token is persisted in the system keychain.
    pub fn with_keychain(config: Config) -> Self {
        let tokens = Arc::new(KeychainTokenStore::new(&config.keyring_service));
        Self::new(config, tokens)
    }

    /// State whose token lives only as long as the process.
    pub fn ephemeral(config: Config) -> Self {
        Self::new(config, Arc::new(MemoryTokenStore::new()))
    }

    /// The surface the user ended up on, if anything navigated.
    pub fn current_route(&self) -> Option<Route> {
        self.navigator.current()
    }
}
