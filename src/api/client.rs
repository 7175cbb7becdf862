//! HTTP client with bearer token injection and failure normalization.
//!
//! Every request reads the token from the [`TokenStore`] at send time, so a
//! token written by one call is seen by the next. Non-success outcomes are
//! mapped to [`ApiError`]; a 401 additionally clears the persisted token and
//! sends the user back to the login surface, whichever call triggered it.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;

use super::auth::TokenStore;
use super::error::ApiError;
use crate::config::Config;
use crate::route::{Navigation, Navigator, Route};

/// HTTP client wrapper for the file repository API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
            navigator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.send(Method::GET, path, self.request(Method::GET, path))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, ApiError> {
        self.send(Method::DELETE, path, self.request(Method::DELETE, path))
            .await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ApiError> {
        let builder = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, builder).await
    }

    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ApiError> {
        let builder = self.request(Method::PATCH, path).json(body);
        self.send(Method::PATCH, path, builder).await
    }

    /// Start a request to a relative API path, attaching the persisted token.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");

        match self.tokens.load() {
            Ok(Some(token)) => builder = builder.bearer_auth(token),
            Ok(None) => {}
            Err(e) => log::warn!("Could not read persisted token, sending without it: {}", e),
        }

        builder
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let resp = builder.send().await.map_err(|e| {
            log::warn!("{} {} failed without a response: {}", method, path, e);
            ApiError::Unreachable(e.to_string())
        })?;

        let status = resp.status();
        log::debug!("{} {} -> {}", method, path, status);

        if status.is_success() {
            return Ok(resp);
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                self.handle_unauthorized();
                ApiError::Unauthorized
            }
            StatusCode::CONFLICT => ApiError::Conflict,
            other => ApiError::Unknown(other.as_u16()),
        })
    }

    fn handle_unauthorized(&self) {
        log::info!("Request rejected as unauthorized, clearing token");
        if let Err(e) = self.tokens.clear() {
            log::warn!("Failed to clear persisted token: {}", e);
        }
        self.navigator.navigate(Navigation::replace(Route::Login));
    }
}
