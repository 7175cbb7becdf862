//! Shared test fixtures: an in-process stub of the file repository API.

use std::sync::Arc;

use axum::Router;

use crate::api::auth::{MemoryTokenStore, TokenStore};
use crate::api::client::ApiClient;
use crate::config::Config;
use crate::route::{HistoryNavigator, Navigator};

/// A client wired to a stub server plus handles on its collaborators.
pub struct StubContext {
    pub api: Arc<ApiClient>,
    pub tokens: Arc<MemoryTokenStore>,
    pub navigator: Arc<HistoryNavigator>,
    pub base_url: String,
}

fn client_for(base_url: String) -> StubContext {
    let tokens = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(HistoryNavigator::new());
    let store: Arc<dyn TokenStore> = tokens.clone();
    let nav: Arc<dyn Navigator> = navigator.clone();
    let api = Arc::new(ApiClient::new(&Config::new(&base_url), store, nav));
    StubContext {
        api,
        tokens,
        navigator,
        base_url,
    }
}

/// Serve `router` on an ephemeral localhost port and return a client for it.
pub async fn spawn_stub(router: Router) -> StubContext {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    client_for(format!("http://{}", addr))
}

/// A client pointed at a port nothing listens on.
pub async fn unreachable_client() -> StubContext {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    client_for(format!("http://{}", addr))
}
