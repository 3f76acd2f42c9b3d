//! # sid-transform
//!
//! Rewrites `sid(...)` marker calls in a Rust syntax tree.
//!
//! ## Marker forms
//!
//! | Source | Function name | Substituted with |
//! |--------|---------------|------------------|
//! | `sid("add two numbers")` | `add_two_numbers` | `add_two_numbers` |
//! | `sid("adder", "add two numbers")` | `adder` | `adder` |
//! | `sid("my adder", "add two numbers")` | `my adder` | `my_adder` |
//! | `sid("loop")` | `loop` | `r#loop` |
//! | `sid()`, `sid(a, b, c)`, `sid(x)` | - | left untouched, error logged |
//!
//! ## Pass
//!
//! The [`MarkerTransformer`] walks every expression in document order. For
//! each valid marker it consults the [`sid_cache::CacheStore`], asks a
//! [`sid_generator::FunctionSource`] on a miss (blocking until the single
//! in-flight generation finishes), records the source text in the
//! [`GeneratedFunctionPool`] and replaces the call according to the
//! [`SubstitutionPolicy`]. Markers inside macros whose arguments are a
//! plain expression list (`println!`, `vec![..]`) are rewritten too.
//!
//! Invalid markers are never fatal: the site is logged, left as written, and
//! its arguments are still searched for nested markers.

pub mod marker;
pub mod policy;
pub mod pool;
pub mod transformer;

pub use marker::{function_ident, is_marker_call, resolve_marker, Location, MarkerCall, MarkerError};
pub use policy::{SubstitutionPolicy, UnknownPolicy};
pub use pool::GeneratedFunctionPool;
pub use transformer::{MarkerTransformer, TransformStats};
