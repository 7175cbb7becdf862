//! Client-side surfaces and the navigator that switches between them.
//!
//! The session store and the HTTP client never render anything themselves;
//! they decide *where* the user should be and hand that decision to a
//! [`Navigator`]. The CLI records the decisions and prints the final one.

use std::sync::Mutex;

/// One of the three front-end surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Admin,
    User { id: String },
}

impl Route {
    /// Route name as used by the router table.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Admin => "admin",
            Route::User { .. } => "user",
        }
    }

    /// Concrete path with parameters filled in (`/user/:id` → `/user/42`).
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::User { id } => format!("/user/{}", id),
        }
    }
}

/// A single navigation request.
///
/// `replace` mirrors history replacement: the previous surface is not kept
/// as a back target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub replace: bool,
}

impl Navigation {
    pub fn replace(route: Route) -> Self {
        Self { route, replace: true }
    }

    pub fn push(route: Route) -> Self {
        Self {
            route,
            replace: false,
        }
    }
}

/// Receives navigation decisions.
///
/// Implementations must be cheap and infallible: they are called from error
/// paths (e.g. a 401 response) where nothing else can be done on failure.
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}

/// Navigator that keeps the full history of requested navigations.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent navigation, if any.
    pub fn last(&self) -> Option<Navigation> {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().cloned())
    }

    /// The current surface after applying every recorded navigation.
    pub fn current(&self) -> Option<Route> {
        self.last().map(|n| n.route)
    }

    #[cfg(test)]
    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, navigation: Navigation) {
        log::debug!(
            "Navigating to {} (replace: {})",
            navigation.route.path(),
            navigation.replace
        );
        if let Ok(mut history) = self.history.lock() {
            history.push(navigation);
        }
    }
}
