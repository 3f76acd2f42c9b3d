//! # sid-core
//!
//! Core types shared by the marker compiler crates.
//!
//! ## Generation keys
//!
//! A unit of generated code is identified by a `(function_name, description)`
//! pair. Keys compare structurally: two keys with equal fields are the same
//! cache entry.
//!
//! | Marker form | Function name | Description |
//! |-------------|---------------|-------------|
//! | `sid("add two numbers")` | `add_two_numbers` | `add two numbers` |
//! | `sid("adder", "add two numbers")` | `adder` | `add two numbers` |
//!
//! ## Persisted key encoding
//!
//! Keys are persisted as a two-element JSON array, e.g.
//! `["adder","add two numbers"]`. The encoding is lossless for any pair of
//! strings, including strings that contain brackets, quotes or commas.
//!
//! ## Clocks
//!
//! Credential freshness is measured against a [`Clock`]. Production code uses
//! [`SystemClock`]; tests drive a [`SimClock`] by hand.

pub mod clock;
pub mod key;

pub use clock::{Clock, SimClock, SystemClock};
pub use key::{derive_function_name, GenerationKey, KeyError};

/// Name of the marker function recognized in source code.
pub const MARKER_NAME: &str = "sid";

/// Default location of the persisted cache, relative to the working directory.
pub const CACHE_FILE_DEFAULT: &str = "function_cache.json";

/// Credentials older than this are refreshed before the next generation call.
pub const TOKEN_TTL_SECONDS: u64 = 600;

/// Upper bound on a single generation request.
pub const REQUEST_TIMEOUT_SECONDS: u64 = 130;
