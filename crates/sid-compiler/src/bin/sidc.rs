//! CLI for the sid marker compiler.
//!
//! # Usage
//!
//! ```bash
//! # Rewrite markers in a file
//! sidc input.rs output.rs
//!
//! # Generate a single function interactively
//! sidc
//!
//! # More detail
//! RUST_LOG=debug sidc input.rs output.rs
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sid_compiler::{logging, Compiler, CompilerConfig};
use sid_generator::FunctionGenerator;
use tracing::error;

/// Replace sid("...") markers in Rust source with generated functions.
///
/// With INPUT and OUTPUT, rewrites INPUT into OUTPUT. With no arguments,
/// asks for a description and prints one generated function.
#[derive(Debug, Parser)]
#[command(name = "sidc", version)]
struct Args {
    /// Rust source file containing sid(...) markers
    #[arg(requires = "output")]
    input: Option<PathBuf>,

    /// Where to write the rewritten source
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init();

    let config = CompilerConfig::from_env();

    let generator = match FunctionGenerator::from_config(config.generator.clone()) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create generator: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut compiler = match Compiler::new(config, Box::new(generator)) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match (args.input, args.output) {
        (Some(input), Some(output)) => {
            compiler.open();
            match compiler.compile_file(&input, &output) {
                Ok(_) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        _ => match compiler.interactive(io::stdin().lock(), io::stdout().lock()) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_two_paths_is_batch() {
        let args = Args::try_parse_from(["sidc", "in.rs", "out.rs"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("in.rs")));
        assert_eq!(args.output, Some(PathBuf::from("out.rs")));
    }

    #[test]
    fn test_no_paths_is_interactive() {
        let args = Args::try_parse_from(["sidc"]).unwrap();
        assert!(args.input.is_none() && args.output.is_none());
    }

    #[test]
    fn test_single_path_is_usage_error() {
        assert!(Args::try_parse_from(["sidc", "in.rs"]).is_err());
        assert!(Args::try_parse_from(["sidc", "a", "b", "c"]).is_err());
    }
}
