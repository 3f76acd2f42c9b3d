//! Bearer credentials for the completion endpoint.
//!
//! A [`TokenManager`] fetches a token lazily on first use and re-fetches it
//! once it is older than the TTL. Tokens are never invalidated otherwise.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sid_core::Clock;
use tracing::debug;

use crate::client::{ClientConfig, ClientError};

/// An opaque bearer credential and the time it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub value: String,
    pub issued_at_ms: u64,
}

impl AuthToken {
    /// Whether the token is older than `ttl` at `now_ms`.
    pub fn is_expired(&self, now_ms: u64, ttl: Duration) -> bool {
        let age_ms = now_ms.saturating_sub(self.issued_at_ms);
        u128::from(age_ms) > ttl.as_millis()
    }
}

/// Anything that can issue a fresh bearer token.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String, ClientError>;
}

/// Token endpoint client.
pub struct HttpTokenSource {
    http: reqwest::Client,
    url: String,
    client_token: Option<String>,
    editor_version: String,
    plugin_version: String,
}

impl HttpTokenSource {
    /// Create a source sharing an existing HTTP connection pool.
    pub fn with_http(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            url: config.token_url.clone(),
            client_token: config.client_token.clone(),
            editor_version: config.editor_version.clone(),
            plugin_version: config.plugin_version.clone(),
        }
    }
}

#[async_trait]
impl CredentialSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<String, ClientError> {
        let mut request = self
            .http
            .get(&self.url)
            .header("Editor-Version", &self.editor_version)
            .header("Editor-Plugin-Version", &self.plugin_version);

        if let Some(ref credential) = self.client_token {
            request = request.header("Authorization", format!("token {}", credential));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_token_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// Extract the `token` field from a token endpoint payload.
pub fn parse_token_response(body: &str) -> Result<String, ClientError> {
    let response: TokenResponse = serde_json::from_str(body)?;
    response
        .token
        .ok_or_else(|| ClientError::MissingToken(body.chars().take(200).collect()))
}

/// Caches one bearer token and refreshes it when it exceeds its TTL.
pub struct TokenManager {
    source: Box<dyn CredentialSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    current: Option<AuthToken>,
}

impl TokenManager {
    /// Create a manager. No token is fetched until [`TokenManager::bearer`].
    pub fn new(source: Box<dyn CredentialSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            current: None,
        }
    }

    /// The current token, if one has been fetched.
    pub fn current(&self) -> Option<&AuthToken> {
        self.current.as_ref()
    }

    /// Whether the next call to [`TokenManager::bearer`] will fetch.
    pub fn needs_refresh(&self) -> bool {
        match self.current {
            Some(ref token) => token.is_expired(self.clock.now_ms(), self.ttl),
            None => true,
        }
    }

    /// Return a valid bearer token, fetching a new one if needed.
    ///
    /// A failed refresh keeps the previous token so the next call retries.
    pub async fn bearer(&mut self) -> Result<String, ClientError> {
        if self.needs_refresh() {
            debug!("Refreshing completion credential");
            let value = self.source.fetch_token().await?;
            self.current = Some(AuthToken {
                value,
                issued_at_ms: self.clock.now_ms(),
            });
        }

        match self.current {
            Some(ref token) => Ok(token.value.clone()),
            None => Err(ClientError::MissingToken(String::new())),
        }
    }
}
