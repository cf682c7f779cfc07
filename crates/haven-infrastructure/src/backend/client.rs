//! HTTP client for the hosted backend.
//!
//! Every request carries the project `apikey` header plus a bearer token:
//! the signed-in user's access token when there is one, the anon key
//! otherwise.

use haven_core::config::BackendConfig;
use haven_core::error::{HavenError, ProviderError, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared connection to one backend project.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(HavenError::config(
                "backend.url and backend.anon_key must be set",
            ));
        }
        Ok(Self {
            http: Client::new(),
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.trim().to_string(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Sets the token used to authorize subsequent requests.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    /// Builds an authorized request.
    pub(crate) async fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());
        self.authorized(method, url, &bearer)
    }

    /// Builds a request authorized with an explicit token.
    pub(crate) fn authorized(&self, method: Method, url: &str, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .timeout(REQUEST_TIMEOUT)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    /// Sends a request and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ProviderError> {
        let response = Self::send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::new(format!("Invalid response body: {}", e)))
    }

    /// Sends a request, discarding the body.
    pub(crate) async fn send_empty(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<(), ProviderError> {
        Self::send(request).await.map(|_| ())
    }

    async fn send(request: RequestBuilder) -> std::result::Result<Response, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        tracing::debug!("[Backend] {} -> {}", status, message);
        Err(ProviderError::with_status(message, status.as_u16()))
    }
}

/// Extracts the provider message from an error body.
///
/// Auth endpoints use `msg` or `error_description`, the row API uses
/// `message`; `error` is the last resort.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
