//! What a rewritten marker site becomes.

use std::str::FromStr;

use syn::punctuated::Punctuated;
use syn::{Expr, ExprCall, ExprPath, Ident};

/// Replacement for a resolved marker call.
///
/// `Reference` substitutes the bare function name (`add_two_numbers`), which
/// is the historical behaviour: the marker expression evaluates to the
/// function item rather than calling it. `Call` substitutes a zero-argument
/// call (`add_two_numbers()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionPolicy {
    #[default]
    Reference,
    Call,
}

impl SubstitutionPolicy {
    /// Expression that replaces the marker call.
    pub fn substitute(self, ident: Ident) -> Expr {
        let reference = Expr::Path(ExprPath {
            attrs: Vec::new(),
            qself: None,
            path: ident.into(),
        });

        match self {
            SubstitutionPolicy::Reference => reference,
            SubstitutionPolicy::Call => Expr::Call(ExprCall {
                attrs: Vec::new(),
                func: Box::new(reference),
                paren_token: Default::default(),
                args: Punctuated::new(),
            }),
        }
    }

    /// Name used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            SubstitutionPolicy::Reference => "reference",
            SubstitutionPolicy::Call => "call",
        }
    }
}

impl FromStr for SubstitutionPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reference" | "ref" => Ok(SubstitutionPolicy::Reference),
            "call" => Ok(SubstitutionPolicy::Call),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Unrecognised policy name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown substitution policy {0:?} (expected \"reference\" or \"call\")")]
pub struct UnknownPolicy(pub String);
