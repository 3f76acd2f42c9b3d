//! Compiler configuration.

use std::path::PathBuf;

use sid_core::CACHE_FILE_DEFAULT;
use sid_generator::GeneratorConfig;
use sid_transform::SubstitutionPolicy;
use tracing::warn;

/// Compiler configuration.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Persisted cache location
    pub cache_path: PathBuf,
    /// What a rewritten marker becomes
    pub policy: SubstitutionPolicy,
    /// Backend settings
    pub generator: GeneratorConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(CACHE_FILE_DEFAULT),
            policy: SubstitutionPolicy::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl CompilerConfig {
    /// Defaults overridden by `SID_*` environment variables.
    ///
    /// An unrecognised `SID_SUBSTITUTION` is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self {
            generator: GeneratorConfig::from_env(),
            ..Default::default()
        };

        if let Ok(path) = std::env::var("SID_CACHE_FILE") {
            config.cache_path = PathBuf::from(path);
        }

        if let Ok(policy) = std::env::var("SID_SUBSTITUTION") {
            match policy.parse() {
                Ok(policy) => config.policy = policy,
                Err(e) => warn!("{}; using {}", e, config.policy.name()),
            }
        }

        config
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_policy(mut self, policy: SubstitutionPolicy) -> Self {
        self.policy = policy;
        self
    }
}
