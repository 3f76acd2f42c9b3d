//! # sid-generator
//!
//! Turns a `(function_name, description)` pair into Rust source by asking a
//! chat-completion backend.
//!
//! ## Contract
//!
//! [`FunctionSource::generate`] never fails loudly. Credential failures,
//! network failures, non-success responses, timeouts and responses that do
//! not parse as Rust all collapse to an empty string, which callers treat as
//! "no function body". Use [`FunctionGenerator::try_generate`] to see the
//! typed error.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ TokenManager │ ──> │  Completion  │ ──> │ Fence strip  │
//! │ (TTL 600 s)  │     │   Backend    │     │  + syn parse │
//! └──────────────┘     └──────────────┘     └──────┬───────┘
//!                                                  │
//!                                     ok: source   │   err: ""
//!                                                  ▼
//!                                           FunctionSource
//! ```

pub mod client;
pub mod generator;
pub mod prompt;
pub mod token;

pub use client::{ChatClient, ClientConfig, ClientError, CompletionBackend, CompletionRequest, Message, Role};
pub use generator::{FunctionGenerator, FunctionSource, GeneratorConfig, GeneratorError};
pub use prompt::{code_text, extract_code_block, PromptBuilder};
pub use token::{AuthToken, CredentialSource, HttpTokenSource, TokenManager};
