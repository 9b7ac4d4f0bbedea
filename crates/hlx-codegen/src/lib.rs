//! CX-IR emission for the HLX compiler.
//!
//! Lowers the typed AST produced by `hlx-parser` into a linear sequence of
//! IR tokens whose textual concatenation is a valid C++-dialect translation
//! unit, ready to hand to an external C++ toolchain.
//!
//! The [`emitter::CxEmitter`] implements the AST visitor; [`tokens`] defines
//! the IR token model. Key lowerings: `let` bindings become declarations
//! (`auto` when untyped), `self` becomes `(*this)`, interfaces become
//! template concepts, classes get access-section markers with the receiver
//! stripped from methods, operator overloads emit an inline `operator`
//! forwarder, and `"c++"` FFI imports become preprocessor includes.

pub mod emitter;
pub mod tokens;

pub use emitter::{CxEmitter, EmitError};
pub use tokens::{CxToken, CxTokenKind};
