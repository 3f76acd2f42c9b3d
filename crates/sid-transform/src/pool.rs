//! Generated function fragments collected during one pass.

/// Insertion-ordered generated source fragments.
///
/// Failed generations are recorded as empty fragments; they keep their slot
/// so `fragments()[i]` lines up with the i-th rewritten marker, but they
/// contribute no text to [`GeneratedFunctionPool::emit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFunctionPool {
    fragments: Vec<String>,
}

impl GeneratedFunctionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: String) {
        self.fragments.push(fragment);
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Non-empty fragments joined by a blank line.
    pub fn render(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.trim_end())
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Generated definitions followed by the rewritten module.
    pub fn emit(&self, file: &syn::File) -> String {
        let module = prettyplease::unparse(file);
        let definitions = self.render();

        if definitions.is_empty() {
            module
        } else {
            format!("{}\n\n{}", definitions, module)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_preserves_order_and_skips_empty() {
        let mut pool = GeneratedFunctionPool::new();
        pool.push("fn a() {}\n".to_string());
        pool.push(String::new());
        pool.push("fn b() {}".to_string());

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.fragments()[1], "");
        assert_eq!(pool.render(), "fn a() {}\n\nfn b() {}");
    }

    #[test]
    fn test_emit_prepends_definitions() {
        let mut pool = GeneratedFunctionPool::new();
        pool.push("fn a() {}".to_string());

        let file = syn::parse_file("fn main() { let x = a; }").unwrap();
        let output = pool.emit(&file);

        assert!(output.starts_with("fn a() {}\n\nfn main() {"));
        assert!(output.contains("let x = a;"));
    }

    #[test]
    fn test_emit_without_definitions_is_module_only() {
        let pool = GeneratedFunctionPool::new();
        let file = syn::parse_file("fn main() {}").unwrap();
        assert_eq!(pool.emit(&file), prettyplease::unparse(&file));
    }
}
