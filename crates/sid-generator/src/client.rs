//! Chat-completion HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sid_core::REQUEST_TIMEOUT_SECONDS;

/// Endpoint and request settings shared by the completion and token clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Chat-completion endpoint
    pub completions_url: String,
    /// Token-issuing endpoint
    pub token_url: String,
    /// Credential presented to the token endpoint, if any
    pub client_token: Option<String>,
    /// `Editor-Version` header value
    pub editor_version: String,
    /// `Editor-Plugin-Version` header value
    pub plugin_version: String,
    /// Model selection field
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Bound on a single request
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            completions_url: "https://api.githubcopilot.com/chat/completions".to_string(),
            token_url: "https://api.github.com/token".to_string(),
            client_token: None,
            editor_version: "vscode/1.83.0".to_string(),
            plugin_version: "copilot-chat/0.8.0".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.4,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECONDS),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `SID_*` environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SID_COMPLETIONS_URL") {
            config.completions_url = url;
        }
        if let Ok(url) = std::env::var("SID_TOKEN_URL") {
            config.token_url = url;
        }
        if let Ok(token) = std::env::var("SID_CLIENT_TOKEN") {
            config.client_token = Some(token);
        }
        if let Ok(model) = std::env::var("SID_MODEL") {
            config.model = model;
        }
        if let Some(temperature) = std::env::var("SID_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.temperature = temperature;
        }

        config
    }

    /// Build the underlying HTTP client.
    pub fn http_client(&self) -> Result<reqwest::Client, ClientError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Request body for the completion endpoint.
///
/// The endpoint also expects the prompt's role repeated at the top level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub temperature: f64,
    pub role: Role,
}

/// Anything that can answer a completion request.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `request` with bearer `token` and return the first choice's text.
    async fn complete(&self, token: &str, request: &CompletionRequest) -> Result<String, ClientError>;
}

/// HTTP completion client.
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
    editor_version: String,
}

impl ChatClient {
    /// Create a client from config.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_http(config.http_client()?, config))
    }

    /// Create a client sharing an existing HTTP connection pool.
    pub fn with_http(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            url: config.completions_url.clone(),
            editor_version: config.editor_version.clone(),
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, token: &str, request: &CompletionRequest) -> Result<String, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .header("Editor-Version", &self.editor_version)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_completion(&body)
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Extract the first choice's message content from a response body.
pub fn parse_completion(body: &str) -> Result<String, ClientError> {
    let response: CompletionResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(ClientError::EmptyResponse)
}

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Received {0} HTTP status code")]
    Status(u16),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response contained no choices")]
    EmptyResponse,

    #[error("Token response contained no token: {0}")]
    MissingToken(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest {
            messages: vec![Message::system("write a function")],
            model: "gpt-4".to_string(),
            temperature: 0.4,
            role: Role::System,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["temperature"], 0.4);
        assert_eq!(json["role"], "system");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "write a function");
    }

    #[test]
    fn test_parse_completion_takes_first_choice() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "fn first() {}"}},
                {"message": {"role": "assistant", "content": "fn second() {}"}}
            ]
        }"#;

        assert_eq!(parse_completion(body).unwrap(), "fn first() {}");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(ClientError::EmptyResponse)
        ));
        assert!(matches!(
            parse_completion(r#"{"error": "nope"}"#),
            Err(ClientError::Json(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.timeout, Duration::from_secs(130));
        assert!(config.temperature > 0.0 && config.temperature < 1.0);
    }

    #[test]
    fn test_status_error_message() {
        let error = ClientError::Status(404);
        assert_eq!(error.to_string(), "Received 404 HTTP status code");
    }
}
