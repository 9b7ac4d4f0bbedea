//! Lexer, preprocessor, parser and diagnostics for the HLX language.
//!
//! This crate implements the front half of the HLX compilation pipeline:
//!
//! - [`lexer`]: source text to a stream of typed tokens with full positional
//!   metadata
//! - [`preprocessor`]: token-level import resolution, macro expansion, FFI
//!   block handling and namespace tracking
//! - [`parser`]: a hand-written recursive-descent parser producing the typed
//!   AST defined in `hlx-ast`
//! - [`diagnostics`]: the error-code table, the diagnostic engine and the
//!   caret/quick-fix renderer
//!
//! The [`token`] and [`stream`] modules define the token value type and the
//! cursor-based stream all stages operate on.

pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod stream;
pub mod token;

pub use diagnostics::DiagnosticEngine;
pub use lexer::Lexer;
pub use parser::Parser;
pub use preprocessor::Preprocessor;
pub use stream::TokenStream;
pub use token::{Token, TokenKind};
