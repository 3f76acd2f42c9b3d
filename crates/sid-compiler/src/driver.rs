//! Batch and interactive compilation.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use sid_cache::CacheStore;
use sid_core::derive_function_name;
use sid_generator::FunctionSource;
use sid_transform::{GeneratedFunctionPool, MarkerTransformer, TransformStats};
use tokio::runtime::Runtime;
use tracing::{error, info};

use crate::config::CompilerConfig;

/// Result of compiling one source text.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Generated definitions followed by the rewritten module
    pub text: String,
    /// Every fragment produced, one per rewritten marker
    pub pool: GeneratedFunctionPool,
    pub stats: TransformStats,
}

/// The marker compiler.
///
/// Construction does no I/O. Call [`Compiler::open`] to load the persisted
/// cache before a batch run.
pub struct Compiler {
    config: CompilerConfig,
    cache: CacheStore,
    source: Box<dyn FunctionSource>,
    runtime: Runtime,
}

impl Compiler {
    /// Create a compiler that generates through `source`.
    pub fn new(config: CompilerConfig, source: Box<dyn FunctionSource>) -> Result<Self, DriverError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DriverError::Runtime)?;
        let cache = CacheStore::new(&config.cache_path);

        Ok(Self {
            config,
            cache,
            source,
            runtime,
        })
    }

    /// Load the persisted cache.
    pub fn open(&mut self) {
        self.cache.load();
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Rewrite the markers in `text`.
    pub fn compile_source(&mut self, text: &str) -> Result<CompileOutput, DriverError> {
        let mut file = syn::parse_file(text).map_err(|e| DriverError::Parse(e.to_string()))?;

        let mut transformer = MarkerTransformer::new(&mut self.cache, self.source.as_mut(), &self.runtime)
            .with_policy(self.config.policy);
        transformer.transform_file(&mut file);
        let (pool, stats) = transformer.finish();

        Ok(CompileOutput {
            text: pool.emit(&file),
            pool,
            stats,
        })
    }

    /// Compile `input` into `output`.
    ///
    /// Failures are logged and returned; nothing is written on a read or
    /// parse failure.
    pub fn compile_file(&mut self, input: &Path, output: &Path) -> Result<TransformStats, DriverError> {
        let result = self.try_compile_file(input, output);
        match result {
            Ok(ref stats) => info!("Wrote {}: {}", output.display(), stats.format_summary()),
            Err(ref e) => error!("{}", e),
        }
        result
    }

    fn try_compile_file(&mut self, input: &Path, output: &Path) -> Result<TransformStats, DriverError> {
        let text = std::fs::read_to_string(input).map_err(|source| DriverError::Read {
            path: input.to_path_buf(),
            source,
        })?;

        let compiled = self.compile_source(&text)?;

        std::fs::write(output, compiled.text).map_err(|source| DriverError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        Ok(compiled.stats)
    }

    /// Prompt once for a description and print the generated function.
    ///
    /// Bypasses the cache entirely.
    pub fn interactive<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<String, DriverError> {
        write!(output, "Enter a description of the function you want to generate: ").map_err(DriverError::Console)?;
        output.flush().map_err(DriverError::Console)?;

        let mut line = String::new();
        input.read_line(&mut line).map_err(DriverError::Console)?;
        let description = line.trim_end_matches(['\r', '\n']);
        let function_name = derive_function_name(description);

        let code = self
            .runtime
            .block_on(self.source.generate(&function_name, description));

        writeln!(output, "Generated code:\n\n{}\n", code).map_err(DriverError::Console)?;
        Ok(code)
    }
}

/// Driver errors.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Failed to read input file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse input: {0}")]
    Parse(String),

    #[error("Console error: {0}")]
    Console(std::io::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),
}
