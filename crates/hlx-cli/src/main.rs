//! HLX CLI
//!
//! Command-line interface for the HLX compiler: argument parsing, pipeline
//! orchestration and the hand-off to the external C++ toolchain.

mod driver;
mod toolchain;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Exit code for unrecoverable internal errors (a required source line
/// could not be retrieved while rendering a diagnostic).
const EXIT_INTERNAL: i32 = 288;

/// The HLX compiler
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Input source file
    #[clap(value_parser)]
    pub input: PathBuf,

    /// Output file path
    #[clap(short = 'o', value_parser)]
    pub output: Option<PathBuf>,

    /// Output tokenized source code
    #[clap(long)]
    pub emit_tokens: bool,

    /// Output the AST in JSON format
    #[clap(long)]
    pub emit_ast: bool,

    /// Output the intermediate representation (C++)
    #[clap(long)]
    pub emit_ir: bool,

    /// Output LLVM IR (delegated to the C++ toolchain)
    #[clap(long)]
    pub emit_llvm: bool,

    /// Output assembly (delegated to the C++ toolchain)
    #[clap(long)]
    pub emit_asm: bool,

    /// Optimization level (1-5)
    #[clap(short = 'O', default_value = "1", value_parser = clap::value_parser!(u8).range(1..=5))]
    pub opt_level: u8,

    /// Target triple
    #[clap(long)]
    pub target: Option<String>,

    /// Target architecture
    #[clap(long)]
    pub arch: Option<String>,

    /// Target CPU
    #[clap(long)]
    pub cpu: Option<String>,

    /// Path to an SDK
    #[clap(long)]
    pub sdk: Option<PathBuf>,

    /// Configuration file
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Build in release mode
    #[clap(long, short = 'r')]
    pub release: bool,

    /// Build in debug mode with symbols
    #[clap(long, short = 'd')]
    pub debug: bool,

    /// Show verbose output
    #[clap(long)]
    pub verbose: bool,

    /// Suppress all output
    #[clap(long)]
    pub quiet: bool,

    /// Include directories, searched during import resolution
    #[clap(short = 'I', value_parser)]
    pub include_dirs: Vec<PathBuf>,

    /// Library directories
    #[clap(short = 'L', value_parser)]
    pub lib_dirs: Vec<PathBuf>,

    /// Libraries to link
    #[clap(short = 'l', value_parser)]
    pub libs: Vec<String>,

    /// Module directory
    #[clap(short = 'm', value_parser)]
    pub module_dir: Option<PathBuf>,

    /// Compile as a library
    #[clap(long)]
    pub lib: bool,

    /// Library ABI: generate Python stubs
    #[clap(long)]
    pub python: bool,

    /// Library ABI: generate Rust sources
    #[clap(long)]
    pub rust: bool,

    /// Library ABI: generate C++ headers
    #[clap(long)]
    pub cxx: bool,

    /// Library ABI: HLX-native library
    #[clap(long = "hlx")]
    pub hlx_abi: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.quiet {
        "off"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match driver::run(&args) {
        Ok(status) => status,
        Err(driver::DriverError::Internal(err)) => {
            log::error!("{err}");
            std::process::exit(EXIT_INTERNAL);
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
