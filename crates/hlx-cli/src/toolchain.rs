//! Hand-off to the external C++ toolchain.
//!
//! The emitted CX-IR text is written to a temporary file tagged as C++
//! source and compiled by a `clang`-like driver with standard cross-compile
//! options. This module is a thin wrapper; everything interesting happened
//! before it.

use std::io::Write as _;
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::Args;

/// Compiles the IR text to the requested output.
///
/// ## Errors
///
/// Fails when the temporary file cannot be created or the toolchain exits
/// unsuccessfully.
pub fn compile(args: &Args, ir: &str) -> Result<()> {
    let mut unit = tempfile::Builder::new()
        .prefix("hlx-unit-")
        .suffix(".cpp")
        .tempfile()
        .context("cannot create temporary translation unit")?;

    unit.write_all(ir.as_bytes())
        .context("cannot write temporary translation unit")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("o"));

    let mut command = Command::new("clang++");
    let _ = command
        .arg("-x")
        .arg("c++")
        .arg("-std=c++23")
        .arg(unit.path())
        .arg("-c")
        .arg("-o")
        .arg(&output)
        .arg(format!("-O{}", args.opt_level.min(3)));

    if args.debug {
        let _ = command.arg("-g");
    }

    if let Some(target) = &args.target {
        let _ = command.arg(format!("--target={target}"));
    }

    if let Some(arch) = &args.arch {
        let _ = command.arg(format!("-march={arch}"));
    }

    if let Some(cpu) = &args.cpu {
        let _ = command.arg(format!("-mcpu={cpu}"));
    }

    if let Some(sdk) = &args.sdk {
        let _ = command.arg("--sysroot").arg(sdk);
    }

    for dir in &args.lib_dirs {
        let _ = command.arg("-L").arg(dir);
    }

    for lib in &args.libs {
        let _ = command.arg(format!("-l{lib}"));
    }

    if args.emit_llvm {
        let _ = command.arg("-emit-llvm");
    }

    if args.emit_asm {
        let _ = command.arg("-S");
    }

    log::debug!("invoking toolchain: {command:?}");

    let status = command.status().context("cannot invoke clang++")?;

    if !status.success() {
        bail!("clang++ exited with {status}");
    }

    log::info!("wrote {}", output.display());
    Ok(())
}
