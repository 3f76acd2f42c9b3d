//! Function generator.
//!
//! One completion request per call: refresh credential, prompt, strip
//! fences, check the result parses as a Rust file.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sid_core::{Clock, SystemClock, TOKEN_TTL_SECONDS};
use tracing::error;

use crate::client::{ChatClient, ClientConfig, ClientError, CompletionBackend};
use crate::prompt::{code_text, PromptBuilder};
use crate::token::{HttpTokenSource, TokenManager};

/// Source of generated function text.
///
/// Returns an empty string when generation fails; callers proceed without a
/// function body.
#[async_trait]
pub trait FunctionSource: Send {
    async fn generate(&mut self, function_name: &str, description: &str) -> String;
}

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Endpoints, headers and request parameters
    pub client: ClientConfig,
    /// Credentials older than this are refreshed before a request
    pub token_ttl: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            token_ttl: Duration::from_secs(TOKEN_TTL_SECONDS),
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by `SID_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            ..Default::default()
        }
    }
}

/// Completion-backed [`FunctionSource`].
pub struct FunctionGenerator {
    backend: Box<dyn CompletionBackend>,
    tokens: TokenManager,
    client: ClientConfig,
}

impl FunctionGenerator {
    /// Create a generator from its parts.
    ///
    /// Nothing is fetched until the first generation.
    pub fn new(backend: Box<dyn CompletionBackend>, tokens: TokenManager, client: ClientConfig) -> Self {
        Self {
            backend,
            tokens,
            client,
        }
    }

    /// Create an HTTP-backed generator using the system clock.
    pub fn from_config(config: GeneratorConfig) -> Result<Self, ClientError> {
        let http = config.client.http_client()?;
        let backend = ChatClient::with_http(http.clone(), &config.client);
        let source = HttpTokenSource::with_http(http, &config.client);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let tokens = TokenManager::new(Box::new(source), clock, config.token_ttl);

        Ok(Self::new(Box::new(backend), tokens, config.client))
    }

    /// Generate source for one function, reporting why it failed.
    pub async fn try_generate(&mut self, function_name: &str, description: &str) -> Result<String, GeneratorError> {
        let token = self.tokens.bearer().await?;
        let request = PromptBuilder::build_request(function_name, description, &self.client);

        let timeout = self.client.timeout;
        let response = tokio::time::timeout(timeout, self.backend.complete(&token, &request))
            .await
            .map_err(|_| ClientError::Timeout(timeout))??;

        let code = code_text(&response);
        validate_source(&code)?;
        Ok(code)
    }
}

#[async_trait]
impl FunctionSource for FunctionGenerator {
    async fn generate(&mut self, function_name: &str, description: &str) -> String {
        match self.try_generate(function_name, description).await {
            Ok(code) => code,
            Err(e) => {
                error!("Failed to generate function: {}", e);
                String::new()
            }
        }
    }
}

/// Check that `code` parses as a standalone Rust file.
pub fn validate_source(code: &str) -> Result<(), GeneratorError> {
    syn::parse_file(code)
        .map(|_| ())
        .map_err(|e| GeneratorError::InvalidSource(e.to_string()))
}

/// Generator errors.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Client error: {0}")]
    ClientError(#[from] ClientError),

    #[error("Generated code does not parse: {0}")]
    InvalidSource(String),
}
