//! Pipeline orchestration.
//!
//! Drives source text through lex → preprocess → parse → emit, honoring the
//! `--emit-*` stop points, and hands the finished IR to the external C++
//! toolchain unless an emit flag asked for an intermediate artifact.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use hlx_codegen::CxEmitter;
use hlx_parser::diagnostics::{DiagnosticEngine, EngineError};
use hlx_parser::lexer::Lexer;
use hlx_parser::parser::{ParseError, Parser};
use hlx_parser::preprocessor::{PreprocessError, Preprocessor};
use hlx_source::SourceCache;

use crate::{Args, toolchain};

/// Errors surfaced by the driver.
#[derive(Debug)]
pub enum DriverError {
    /// The input file could not be read.
    Unreadable(PathBuf),
    /// An unrecoverable internal error (maps to exit code 288).
    Internal(EngineError),
    /// Toolchain invocation failed.
    Toolchain(String),
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(path) => {
                write!(f, "cannot read source file `{}`", path.display())
            }
            Self::Internal(err) => write!(f, "internal error: {err}"),
            Self::Toolchain(msg) => write!(f, "toolchain error: {msg}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<EngineError> for DriverError {
    fn from(err: EngineError) -> Self { Self::Internal(err) }
}

impl From<PreprocessError> for DriverError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::Engine(engine) => Self::Internal(engine),
            // Fatal diagnostics were already rendered; the caller only
            // needs a failing status.
            PreprocessError::Fatal => Self::Toolchain("stage aborted".to_owned()),
        }
    }
}

/// Runs the compiler for the parsed arguments.
pub fn run(args: &Args) -> Result<ExitCode, DriverError> {
    let cache = Arc::new(SourceCache::new());
    let engine = DiagnosticEngine::new(Arc::clone(&cache));

    let input: PathBuf = args
        .input
        .canonicalize()
        .unwrap_or_else(|_| args.input.clone());
    let input_name = input.display().to_string();

    let Some(source) = cache.read(&input) else {
        return Err(DriverError::Unreadable(input));
    };

    // Lex.
    let stream = Lexer::new(&source, input_name).tokenize(&engine)?;

    if args.emit_tokens {
        println!(
            "{}",
            serde_json::to_string_pretty(stream.tokens()).unwrap_or_else(|_| "[]".to_owned())
        );
        return Ok(exit_status(&engine));
    }

    if engine.has_errored() {
        return Ok(ExitCode::FAILURE);
    }

    // Preprocess. The module directory participates in import resolution
    // after the explicit include directories.
    let mut stream = stream;
    let mut include_dirs = args.include_dirs.clone();
    if let Some(module_dir) = &args.module_dir {
        include_dirs.push(module_dir.clone());
    }

    let mut preprocessor = Preprocessor::new(&stream, &engine, include_dirs);

    match preprocessor.process(&mut stream) {
        Ok(()) => {}
        Err(PreprocessError::Fatal) => return Ok(ExitCode::FAILURE),
        Err(err) => return Err(err.into()),
    }

    if args.verbose {
        log::debug!("import tree:\n{}", preprocessor.import_tree().render());
    }

    if engine.has_errored() {
        return Ok(ExitCode::FAILURE);
    }

    // Parse.
    let mut parser = Parser::new(&stream, &engine);
    let program = match parser.parse_program() {
        Ok(program) => program,
        Err(ParseError::Engine(err)) => return Err(err.into()),
        Err(ParseError::Syntax) => return Ok(ExitCode::FAILURE),
    };

    if args.emit_ast {
        println!(
            "{}",
            serde_json::to_string_pretty(&program).unwrap_or_else(|_| "{}".to_owned())
        );
        return Ok(exit_status(&engine));
    }

    if engine.has_errored() {
        return Ok(ExitCode::FAILURE);
    }

    // Emit CX-IR.
    let mut emitter = CxEmitter::new(&engine).with_provenance();
    if let Err(hlx_codegen::EmitError::Engine(err)) = emitter.emit_program(&program) {
        return Err(DriverError::Internal(err));
    }

    if engine.has_errored() {
        return Ok(ExitCode::FAILURE);
    }

    let ir = emitter.to_source();

    if args.emit_ir {
        match &args.output {
            Some(path) => {
                if std::fs::write(path, &ir).is_err() {
                    return Err(DriverError::Toolchain(format!(
                        "cannot write IR to `{}`",
                        path.display()
                    )));
                }
            }
            None => println!("{ir}"),
        }

        return Ok(exit_status(&engine));
    }

    // Hand the translation unit to the external C++ toolchain.
    toolchain::compile(args, &ir).map_err(|err| DriverError::Toolchain(format!("{err:#}")))?;

    Ok(exit_status(&engine))
}

/// Non-zero when any error-level diagnostic was reported.
fn exit_status(engine: &DiagnosticEngine) -> ExitCode {
    if engine.has_errored() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
