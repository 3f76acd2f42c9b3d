//! # sid-compiler
//!
//! Drives the marker compiler end to end.
//!
//! ## Batch mode
//!
//! ```bash
//! sidc src/input.rs out/output.rs
//! ```
//!
//! read → parse → rewrite markers → prepend generated definitions → write.
//! Generated bodies are cached in `function_cache.json` (override with
//! `SID_CACHE_FILE`), so a second run over the same input makes no backend
//! calls.
//!
//! ## Interactive mode
//!
//! ```bash
//! sidc
//! Enter a description of the function you want to generate: add two numbers
//! ```
//!
//! Generates one function directly. The cache is neither read nor written.
//!
//! ## Environment
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `SID_CACHE_FILE` | cache location |
//! | `SID_SUBSTITUTION` | `reference` (default) or `call` |
//! | `SID_COMPLETIONS_URL`, `SID_TOKEN_URL` | backend endpoints |
//! | `SID_CLIENT_TOKEN` | credential for the token endpoint |
//! | `SID_MODEL`, `SID_TEMPERATURE` | request parameters |
//! | `RUST_LOG` | log filter (default `info`) |

pub mod config;
pub mod driver;
pub mod logging;

pub use config::CompilerConfig;
pub use driver::{CompileOutput, Compiler, DriverError};
