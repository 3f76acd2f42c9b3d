//! The marker rewriting pass.

use sid_cache::CacheStore;
use sid_generator::FunctionSource;
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{Expr, Macro, Token};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::marker::{is_marker_call, mentions_marker, resolve_marker, Location, MarkerCall};
use crate::policy::SubstitutionPolicy;
use crate::pool::GeneratedFunctionPool;

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Marker sites replaced
    pub rewritten: u64,
    /// Sites served from the cache
    pub cache_hits: u64,
    /// Sites that asked the generator
    pub generated: u64,
    /// Generator calls that returned nothing usable
    pub failed: u64,
    /// Marker sites left untouched because of their shape
    pub skipped: u64,
}

impl TransformStats {
    /// Format as a one-line summary.
    pub fn format_summary(&self) -> String {
        format!(
            "{} rewritten ({} cached, {} generated, {} failed), {} skipped",
            self.rewritten, self.cache_hits, self.generated, self.failed, self.skipped
        )
    }
}

/// Replaces marker calls and collects generated definitions.
///
/// Generation is sequential: each cache miss blocks on `runtime` until the
/// generator answers, and the result is written to the cache before the
/// traversal moves on. Must not be driven from inside an async context.
pub struct MarkerTransformer<'a> {
    cache: &'a mut CacheStore,
    source: &'a mut dyn FunctionSource,
    runtime: &'a Runtime,
    policy: SubstitutionPolicy,
    pool: GeneratedFunctionPool,
    stats: TransformStats,
}

impl<'a> MarkerTransformer<'a> {
    pub fn new(cache: &'a mut CacheStore, source: &'a mut dyn FunctionSource, runtime: &'a Runtime) -> Self {
        Self {
            cache,
            source,
            runtime,
            policy: SubstitutionPolicy::default(),
            pool: GeneratedFunctionPool::new(),
            stats: TransformStats::default(),
        }
    }

    pub fn with_policy(mut self, policy: SubstitutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rewrite every marker in `file`.
    pub fn transform_file(&mut self, file: &mut syn::File) {
        self.visit_file_mut(file);
    }

    pub fn pool(&self) -> &GeneratedFunctionPool {
        &self.pool
    }

    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// Consume the transformer, returning the collected definitions.
    pub fn finish(self) -> (GeneratedFunctionPool, TransformStats) {
        (self.pool, self.stats)
    }

    fn rewrite(&mut self, marker: MarkerCall) -> Expr {
        if marker.explicit_name {
            info!(
                "Generating sid function at {} named \"{}\" described as \"{}\"",
                marker.location, marker.key.function_name, marker.key.description
            );
        } else {
            info!(
                "Generating sid function at {} described as \"{}\"",
                marker.location, marker.key.description
            );
        }
        if marker.ident.unraw() != marker.key.function_name {
            warn!(
                "Function name \"{}\" at {} is not an identifier, referencing it as {}",
                marker.key.function_name, marker.location, marker.ident
            );
        }

        let code = match self.cache.get(&marker.key) {
            Some(code) => {
                debug!("Cache hit for {}", marker.key);
                self.stats.cache_hits += 1;
                code.to_string()
            }
            None => {
                let key = &marker.key;
                let code = self
                    .runtime
                    .block_on(self.source.generate(&key.function_name, &key.description));

                self.stats.generated += 1;
                if code.is_empty() {
                    self.stats.failed += 1;
                }
                self.cache.insert(marker.key.clone(), code.clone());
                code
            }
        };

        info!("Generated code:\n\n{}\n", code);
        self.pool.push(code);
        self.stats.rewritten += 1;

        self.policy.substitute(marker.ident)
    }
}

impl VisitMut for MarkerTransformer<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        let resolved = match &*expr {
            Expr::Call(call) if is_marker_call(call) => Some(resolve_marker(call)),
            _ => None,
        };

        match resolved {
            Some(Ok(marker)) => {
                *expr = self.rewrite(marker);
                return;
            }
            Some(Err(e)) => {
                error!("{}", e);
                self.stats.skipped += 1;
            }
            None => {}
        }

        visit_mut::visit_expr_mut(self, expr);
    }

    /// Macro bodies are opaque to the visitor. Bodies that read as a
    /// comma-separated expression list (`println!`, `vec!`, `assert_eq!`)
    /// are parsed, rewritten and printed back.
    fn visit_macro_mut(&mut self, mac: &mut Macro) {
        if mac.path.is_ident("macro_rules") || !mentions_marker(&mac.tokens) {
            return;
        }

        match mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            Ok(mut args) => {
                let before = self.stats.rewritten;
                for arg in args.iter_mut() {
                    self.visit_expr_mut(arg);
                }
                if self.stats.rewritten != before {
                    mac.tokens = args.into_token_stream();
                }
            }
            Err(_) => {
                error!(
                    "Arguments of {}! at {} are not an expression list! Skipping the sid markers inside.",
                    mac.path.to_token_stream(),
                    Location::at(mac.path.span())
                );
                self.stats.skipped += 1;
            }
        }
    }
}
