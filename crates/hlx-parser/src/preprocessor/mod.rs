//! The preprocessor.
//!
//! Transforms a token stream into a semantically equivalent stream in which
//! imports are inlined, FFI blocks validated and normalized, `define`
//! macros expanded, and `module` nesting tracked for qualified macro names.
//!
//! The pass drives a cursor over the stream and dispatches on the current
//! token; subsequences are replaced in place via [`TokenStream::splice`].
//! Macro expansions rewind the cursor to the splice start so nested
//! invocations expand on the same pass; import splices are skipped over
//! because the imported tokens were preprocessed recursively.

mod define;
mod import;
pub mod import_tree;

use std::path::PathBuf;

pub use define::{MacroDef, MacroParam};
pub use import_tree::{ImportNode, ImportTree};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::diagnostics::{CodeError, DiagnosticEngine, EngineError, Level};
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

/// The ABI strings accepted in `ffi` / `using` blocks. Data, not code.
pub const ALLOWED_ABIS: &[&str] = &["c++", "c", "python", "rust"];

/// Error type of the preprocessing stage.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// A fatal diagnostic was reported; the stage stops.
    #[error("fatal preprocessing error")]
    Fatal,
    /// An internal diagnostic-engine failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result alias for preprocessor routines.
pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// The preprocessor.
///
/// One instance handles one root file and, recursively, everything it
/// imports. State shared across the recursion: the macro table keyed by
/// fully qualified name, the include directories, the import tree and the
/// active import chain used for cycle detection.
#[derive(Debug)]
pub struct Preprocessor<'e> {
    engine: &'e DiagnosticEngine,
    include_dirs: Vec<PathBuf>,
    defines: FxHashMap<String, MacroDef>,
    namespace: Vec<(String, usize)>,
    brace_level: usize,
    active: Vec<PathBuf>,
    tree: ImportTree,
    expansions: usize,
}

impl<'e> Preprocessor<'e> {
    /// Creates a preprocessor for the root file of `stream`.
    #[must_use]
    pub fn new(
        stream: &TokenStream,
        engine: &'e DiagnosticEngine,
        include_dirs: Vec<PathBuf>,
    ) -> Self {
        let root = PathBuf::from(stream.file_name());

        Self {
            engine,
            include_dirs,
            defines: FxHashMap::default(),
            namespace: Vec::new(),
            brace_level: 0,
            active: vec![root.clone()],
            tree: ImportTree::new(root),
            expansions: 0,
        }
    }

    /// Returns the import tree built during the pass.
    #[must_use]
    pub fn import_tree(&self) -> &ImportTree { &self.tree }

    /// Returns the current namespace nesting depth.
    #[must_use]
    pub fn namespace_depth(&self) -> usize { self.namespace.len() }

    /// Runs the pass over `stream`, mutating it in place.
    ///
    /// ## Errors
    ///
    /// Returns [`PreprocessError::Fatal`] when a fatal diagnostic (cyclic
    /// import, unrecoverable FFI shape) was reported, and
    /// [`PreprocessError::Engine`] for internal failures.
    pub fn process(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        log::debug!("preprocessing {}", stream.file_name());
        stream.reset();

        while !stream.at_end() {
            match stream.current().kind {
                TokenKind::Import => self.handle_import(stream)?,
                // A bare `ffi` with no ABI string is the storage modifier;
                // that form belongs to the parser.
                TokenKind::Ffi
                    if stream
                        .peek(1)
                        .is_some_and(|tok| tok.kind == TokenKind::StringLiteral) =>
                {
                    self.handle_ffi(stream)?;
                }
                TokenKind::Using => self.handle_ffi(stream)?,
                TokenKind::Define => self.handle_define(stream)?,
                TokenKind::LogicalNot => self.handle_invocation(stream)?,
                TokenKind::Module => self.handle_module_header(stream)?,
                TokenKind::OpenBrace => {
                    self.brace_level += 1;
                    advance(stream);
                }
                TokenKind::CloseBrace => {
                    if self
                        .namespace
                        .last()
                        .is_some_and(|(_, level)| *level == self.brace_level)
                    {
                        let _ = self.namespace.pop();
                    }

                    self.brace_level = self.brace_level.saturating_sub(1);
                    advance(stream);
                }
                _ => advance(stream),
            }
        }

        Ok(())
    }

    /// Reports a code error, converting a fatal level into a stage abort.
    pub(crate) fn report(&self, error: CodeError) -> PreprocessResult<Level> {
        let level = self.engine.report(error)?;

        if level == Level::Fatal {
            return Err(PreprocessError::Fatal);
        }

        Ok(level)
    }

    pub(crate) fn engine(&self) -> &'e DiagnosticEngine { self.engine }

    /// Tracks `module [a::b] {`, pushing the qualified segment at the brace
    /// it opens. Anonymous modules push an empty segment that does not
    /// contribute to qualification.
    fn handle_module_header(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        advance(stream); // 'module'

        let mut segments: Vec<String> = Vec::new();

        while !stream.at_end() {
            match stream.current().kind {
                TokenKind::Identifier => {
                    segments.push(stream.current().value.clone());
                    advance(stream);
                }
                TokenKind::Scope => advance(stream),
                _ => break,
            }
        }

        if stream.current().kind == TokenKind::OpenBrace {
            self.brace_level += 1;
            self.namespace.push((segments.join("::"), self.brace_level));
            advance(stream);
        }
        // A module without a brace is left for the parser to diagnose.

        Ok(())
    }

    /// Returns the current namespace prefix segments, skipping anonymous
    /// entries.
    pub(crate) fn namespace_prefix(&self) -> Vec<String> {
        self.namespace
            .iter()
            .filter(|(segment, _)| !segment.is_empty())
            .map(|(segment, _)| segment.clone())
            .collect()
    }

    // ---- FFI blocks -----------------------------------------------------

    /// Validates `ffi "<abi>" import "sym";` and the brace-block form, and
    /// normalizes the `using` synonym to `ffi`.
    ///
    /// The validated tokens stay in the stream; lowering the import to the
    /// IR's native include form happens in the emitter, which sees the
    /// parsed FFI declaration.
    fn handle_ffi(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        let keyword_at = stream.position();
        let keyword = stream.current().clone();

        if keyword.kind == TokenKind::Using {
            // Normalized so later stages only deal with one spelling.
            let mut ffi_token = keyword.clone();
            ffi_token.kind = TokenKind::Ffi;
            ffi_token.value = "ffi".to_owned();
            stream.splice(keyword_at, keyword_at + 1, vec![ffi_token]);
        }

        advance(stream);

        // The ABI string.
        let abi = stream.current().clone();
        if abi.kind != TokenKind::StringLiteral {
            let _ = self.report(
                CodeError::new(&keyword, 2004)
                    .arg("detail", "expected an ABI string after the keyword")
                    .without_marking()
                    .quick_fix(
                        " \"...\"",
                        i64::from(keyword.location.column + keyword.location.length),
                    ),
            )?;
            return Ok(());
        }

        if !ALLOWED_ABIS.contains(&abi.unquoted()) {
            let options = ALLOWED_ABIS.join(", ");
            let _ =
                self.report(CodeError::new(&abi, 2003).fix_arg("options", options))?;
        }

        advance(stream);

        match stream.current().kind {
            TokenKind::Import => self.check_ffi_import(stream),
            TokenKind::OpenBrace => self.check_ffi_block(stream),
            _ => {
                let pof = stream.current().clone();
                let _ = self.report(CodeError::new(&pof, 2004).arg(
                    "detail",
                    "expected `import` or an import block after the ABI string",
                ))?;
                Ok(())
            }
        }
    }

    /// `import "sym" ;` with the cursor on `import`.
    fn check_ffi_import(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        advance(stream); // 'import'

        if stream.current().kind != TokenKind::StringLiteral {
            let pof = stream.current().clone();
            let fix = format!("import \"{}\"", pof.value);
            let _ = self.report(
                CodeError::new(&pof, 2004)
                    .arg("detail", "FFI imports take a string literal")
                    .fix_arg("hint", fix),
            )?;
            return Ok(());
        }

        advance(stream); // the string

        if stream.current().kind == TokenKind::Comma {
            let pof = stream.current().clone();
            let _ = self.report(CodeError::new(&pof, 2004).arg(
                "detail",
                "one import per statement; split the list",
            ))?;
            return Ok(());
        }

        if stream.current().kind != TokenKind::Semicolon {
            let prev = stream.peek(-1).cloned().unwrap_or_else(|| stream.current().clone());
            let column = prev.location.column + prev.location.length;
            let pof = Token::new(
                TokenKind::Unknown,
                "",
                hlx_source::Location::new(
                    prev.location.file.clone(),
                    prev.location.line,
                    column,
                    prev.location.offset + prev.location.length,
                    1,
                ),
            );

            let _ = self.report(
                CodeError::new(&pof, 3002)
                    .arg("what", "a semicolon")
                    .fix_arg("what", ";")
                    .quick_fix(";", i64::from(column)),
            )?;
            return Ok(());
        }

        advance(stream); // ';'
        Ok(())
    }

    /// `{ import "a"; import "b"; }` with the cursor on `{`.
    ///
    /// Brace depth must balance; any non-import, non-semicolon token inside
    /// the block is a diagnostic.
    fn check_ffi_block(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        let mut depth = 0i64;

        while !stream.at_end() {
            match stream.current().kind {
                TokenKind::OpenBrace => {
                    depth += 1;
                    advance(stream);
                }
                TokenKind::CloseBrace => {
                    depth -= 1;
                    advance(stream);

                    if depth == 0 {
                        return Ok(());
                    }

                    if depth < 0 {
                        let pof = stream
                            .peek(-1)
                            .cloned()
                            .unwrap_or_else(|| Token::bare(TokenKind::CloseBrace));
                        let _ = self.report(
                            CodeError::new(&pof, 2005).arg("which", "an opening brace"),
                        )?;
                        return Ok(());
                    }
                }
                TokenKind::Import => self.check_ffi_import(stream)?,
                TokenKind::Semicolon => advance(stream),
                _ => {
                    let pof = stream.current().clone();
                    let _ = self.report(CodeError::new(&pof, 2004).arg(
                        "detail",
                        format!("unexpected `{}` inside an FFI block", pof.display_value()),
                    ))?;
                    advance(stream);
                }
            }
        }

        let pof = stream.current().clone();
        let _ = self.report(CodeError::new(&pof, 2005).arg("which", "a closing brace"))?;
        Ok(())
    }
}

/// Advances the cursor, parking on the trailing EOF at the end.
pub(crate) fn advance(stream: &mut TokenStream) {
    let _ = stream.advance(1);
}
