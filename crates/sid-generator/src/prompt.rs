//! Prompt construction and response cleanup.

use crate::client::{ClientConfig, CompletionRequest, Message, Role};

/// Builds the single system-role prompt sent per generated function.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt asking for a Rust function named `function_name` that does
    /// `description`, with no markdown formatting.
    pub fn function_prompt(function_name: &str, description: &str) -> String {
        format!(
            "Below is a rust function with the name {} that does the following: {}. \
             No code blocks/formatting are allowed. Assume any uncertainties.",
            function_name, description
        )
    }

    /// Full completion request for one function.
    pub fn build_request(function_name: &str, description: &str, config: &ClientConfig) -> CompletionRequest {
        CompletionRequest {
            messages: vec![Message::system(Self::function_prompt(function_name, description))],
            model: config.model.clone(),
            temperature: config.temperature,
            role: Role::System,
        }
    }
}

/// Extract the body of the first fenced code block, if there is one.
///
/// The opening fence may carry any language tag; the body starts on the
/// line after it and ends at the next fence.
pub fn extract_code_block(response: &str) -> Option<String> {
    let fence_start = response.find("```")?;
    let after_fence = &response[fence_start + 3..];

    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];

    let body_end = body.find("```")?;
    Some(body[..body_end].to_string())
}

/// The code inside the first fence, or the whole response when unfenced.
pub fn code_text(response: &str) -> String {
    extract_code_block(response).unwrap_or_else(|| response.to_string())
}
