//! Marker call recognition.

use proc_macro2::{Span, TokenStream, TokenTree};
use sid_core::{GenerationKey, MARKER_NAME};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Expr, ExprCall, ExprLit, Ident, Lit};

/// Source position of a marker call. Line is 1-based, column 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Position where `call` starts.
    pub fn of(call: &ExprCall) -> Self {
        Self::at(call.func.span())
    }

    pub fn at(span: Span) -> Self {
        let start = span.start();
        Self {
            line: start.line,
            column: start.column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A validated marker call.
#[derive(Debug, Clone)]
pub struct MarkerCall {
    /// Cache key for the generated function
    pub key: GenerationKey,
    /// Identifier substituted at the call site, see [`function_ident`]
    pub ident: Ident,
    /// Whether the name was given explicitly (two-argument form)
    pub explicit_name: bool,
    /// Where the call appears
    pub location: Location,
}

/// Whether `call` invokes the bare identifier `sid`.
///
/// Qualified paths (`a::sid`, `::sid`, `sid::<T>`) are not markers.
pub fn is_marker_call(call: &ExprCall) -> bool {
    match *call.func {
        Expr::Path(ref path) if path.qself.is_none() => path
            .path
            .get_ident()
            .map_or(false, |ident| ident == MARKER_NAME),
        _ => false,
    }
}

/// Whether `tokens` contain the marker name anywhere, including nested
/// groups.
pub fn mentions_marker(tokens: &TokenStream) -> bool {
    tokens.clone().into_iter().any(|tree| match tree {
        TokenTree::Ident(ident) => ident == MARKER_NAME,
        TokenTree::Group(group) => mentions_marker(&group.stream()),
        _ => false,
    })
}

/// Resolve a marker call's arguments into a [`MarkerCall`].
///
/// - one string literal: description; name is the description with spaces
///   replaced by underscores
/// - two string literals: name, then description, both verbatim
///
/// The key always carries the name verbatim. Only the substituted
/// identifier is adjusted when the name is not a plain identifier.
pub fn resolve_marker(call: &ExprCall) -> Result<MarkerCall, MarkerError> {
    let at = Location::of(call);

    let literals = call
        .args
        .iter()
        .enumerate()
        .map(|(index, arg)| string_literal(arg).ok_or(MarkerError::NotAStringLiteral { at, index }));

    let (key, explicit_name) = match call.args.len() {
        1 => {
            let description = literals.collect::<Result<Vec<_>, _>>()?.remove(0);
            (GenerationKey::from_description(description), false)
        }
        2 => {
            let mut values = literals.collect::<Result<Vec<_>, _>>()?;
            let description = values.remove(1);
            let function_name = values.remove(0);
            (GenerationKey::new(function_name, description), true)
        }
        count => return Err(MarkerError::WrongArity { at, count }),
    };

    let ident = function_ident(&key.function_name);

    Ok(MarkerCall {
        key,
        ident,
        explicit_name,
        location: at,
    })
}

/// Identifier referencing the function generated for `name`.
///
/// - a valid identifier is used as is
/// - a keyword becomes a raw identifier (`loop` → `r#loop`)
/// - anything else has each character outside `[A-Za-z0-9_]` replaced by
///   `_`, prefixed with `sid_` when the result still cannot stand alone
///   (`add two numbers.` → `add_two_numbers_`, `2 numbers` → `sid_2_numbers`)
pub fn function_ident(name: &str) -> Ident {
    if let Some(ident) = parse_ident(name) {
        return ident;
    }

    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    // `sid_` followed by [A-Za-z0-9_]* is always a valid identifier
    parse_ident(&sanitized).unwrap_or_else(|| Ident::new(&format!("sid_{}", sanitized), Span::call_site()))
}

fn parse_ident(name: &str) -> Option<Ident> {
    syn::parse_str::<Ident>(name)
        .or_else(|_| syn::parse_str::<Ident>(&format!("r#{}", name)))
        .ok()
        // the tokenizer drops comments and surrounding whitespace
        .filter(|ident| ident.unraw() == name)
}

fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Some(s.value()),
        _ => None,
    }
}

/// Marker shape errors. The call site is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("Wrong number of arguments at {at}! Expected 1 or 2, got {count}. Skipping.")]
    WrongArity { at: Location, count: usize },

    #[error("Argument {index} at {at} is not a string literal! Skipping.")]
    NotAStringLiteral { at: Location, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(src: &str) -> ExprCall {
        syn::parse_str::<ExprCall>(src).unwrap()
    }

    #[test]
    fn test_marker_recognition() {
        assert!(is_marker_call(&call(r#"sid("x")"#)));
        assert!(is_marker_call(&call("sid()")));
        assert!(!is_marker_call(&call(r#"other("x")"#)));
        assert!(!is_marker_call(&call(r#"a::sid("x")"#)));
        assert!(!is_marker_call(&call(r#"::sid("x")"#)));
        assert!(!is_marker_call(&call(r#"sid::<u8>("x")"#)));
        assert!(!is_marker_call(&call(r#"(sid)("x")"#)));
    }

    #[test]
    fn test_mentions_marker() {
        let tokens: TokenStream = syn::parse_str(r#""{}", wrap(sid("x"))"#).unwrap();
        assert!(mentions_marker(&tokens));

        let tokens: TokenStream = syn::parse_str(r#""sid", side(x)"#).unwrap();
        assert!(!mentions_marker(&tokens));
    }

    #[test]
    fn test_one_argument_derives_name() {
        let marker = resolve_marker(&call(r#"sid("add two numbers")"#)).unwrap();
        assert_eq!(marker.key, GenerationKey::new("add_two_numbers", "add two numbers"));
        assert_eq!(marker.ident, "add_two_numbers");
        assert!(!marker.explicit_name);
    }

    #[test]
    fn test_two_arguments_are_verbatim() {
        let marker = resolve_marker(&call(r#"sid("adder", "add two numbers")"#)).unwrap();
        assert_eq!(marker.key, GenerationKey::new("adder", "add two numbers"));
        assert_eq!(marker.ident, "adder");
        assert!(marker.explicit_name);
    }

    #[test]
    fn test_explicit_name_with_spaces_is_key_verbatim() {
        let marker = resolve_marker(&call(r#"sid("my adder", "add two numbers")"#)).unwrap();
        assert_eq!(marker.key, GenerationKey::new("my adder", "add two numbers"));
        assert_eq!(marker.ident, "my_adder");
        assert!(marker.explicit_name);
    }

    #[test]
    fn test_wrong_arity() {
        for (src, expected) in [("sid()", 0), (r#"sid("a", "b", "c")"#, 3)] {
            match resolve_marker(&call(src)) {
                Err(MarkerError::WrongArity { count, .. }) => assert_eq!(count, expected),
                other => panic!("expected WrongArity for {}, got {:?}", src, other),
            }
        }
    }

    #[test]
    fn test_non_literal_arguments() {
        assert!(matches!(
            resolve_marker(&call("sid(description)")),
            Err(MarkerError::NotAStringLiteral { index: 0, .. })
        ));
        assert!(matches!(
            resolve_marker(&call(r#"sid("name", format!("x"))"#)),
            Err(MarkerError::NotAStringLiteral { index: 1, .. })
        ));
        assert!(matches!(
            resolve_marker(&call(r#"sid(b"bytes")"#)),
            Err(MarkerError::NotAStringLiteral { index: 0, .. })
        ));
        assert!(matches!(
            resolve_marker(&call("sid(42)")),
            Err(MarkerError::NotAStringLiteral { index: 0, .. })
        ));
    }

    #[test]
    fn test_derived_names_keep_punctuation_in_key() {
        let marker = resolve_marker(&call(r#"sid("return the user's name")"#)).unwrap();
        assert_eq!(marker.key.function_name, "return_the_user's_name");
        assert_eq!(marker.ident, "return_the_user_s_name");

        let marker = resolve_marker(&call(r#"sid("add two numbers.")"#)).unwrap();
        assert_eq!(marker.key.function_name, "add_two_numbers.");
        assert_eq!(marker.ident, "add_two_numbers_");
    }

    #[test]
    fn test_function_ident() {
        assert_eq!(function_ident("adder").to_string(), "adder");
        assert_eq!(function_ident("größe").to_string(), "größe");
        assert_eq!(function_ident("loop").to_string(), "r#loop");
        assert_eq!(function_ident("fn").to_string(), "r#fn");
        assert_eq!(function_ident("self").to_string(), "sid_self");
        assert_eq!(function_ident("2_numbers").to_string(), "sid_2_numbers");
        assert_eq!(function_ident("add!").to_string(), "add_");
        assert_eq!(function_ident("!").to_string(), "sid__");
        assert_eq!(function_ident("").to_string(), "sid_");
        assert_eq!(function_ident(" adder").to_string(), "_adder");
        assert_eq!(function_ident("a // b").to_string(), "a____b");
    }

    #[test]
    fn test_escaped_literal_value() {
        let marker = resolve_marker(&call(r#"sid("say \"hi\"", "quote it")"#)).unwrap();
        assert_eq!(marker.key.function_name, "say \"hi\"");
        assert_eq!(marker.ident, "say__hi_");

        let marker = resolve_marker(&call(r#"sid("greet", "say \"hi\"")"#)).unwrap();
        assert_eq!(marker.key.description, "say \"hi\"");
    }

    #[test]
    fn test_location() {
        let file = syn::parse_file("fn main() {\n    let x = sid(\"x\");\n}\n").unwrap();
        let syn::Item::Fn(ref item) = file.items[0] else {
            panic!("expected fn");
        };
        let syn::Stmt::Local(ref local) = item.block.stmts[0] else {
            panic!("expected let");
        };
        let init = local.init.as_ref().unwrap();
        let Expr::Call(ref call) = *init.expr else {
            panic!("expected call");
        };

        let marker = resolve_marker(call).unwrap();
        assert_eq!(marker.location, Location { line: 2, column: 12 });
        assert_eq!(marker.location.to_string(), "2:12");
    }
}
