//! The diagnostic engine.
//!
//! Diagnostics are structured records accumulated in an engine instance that
//! is threaded explicitly through every stage; there is no hidden global
//! state. A record is either a *code error* — anchored to a point-of-failure
//! token, rendered with a caret and optional quick fixes — or a *compiler
//! error* with no source anchor.
//!
//! Severity is ordered `Note < Warn < Error < Fatal`. `Error` and above set
//! the engine's `has_errored` flag; a `Fatal` report tells the calling stage
//! to stop. Records are appended in the order they occur and are never
//! mutated afterwards.

pub mod codes;
pub mod render;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hlx_source::SourceCache;
use serde::Serialize;
use thiserror::Error;

pub use codes::{ERROR_TABLE, ErrorTemplate};

use crate::token::Token;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Additional information attached to other diagnostics
    Note,
    /// A warning that does not fail the compilation
    Warn,
    /// An error; compilation fails but the stage continues
    Error,
    /// An error that terminates the current stage
    Fatal,
}

impl Level {
    /// Returns the label rendered in front of the message.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Returns the ANSI color for the label.
    #[must_use]
    pub const fn color_code(&self) -> &'static str {
        match self {
            Self::Note => "\x1b[1;36m",           // Bold cyan
            Self::Warn => "\x1b[1;33m",           // Bold yellow
            Self::Error | Self::Fatal => "\x1b[1;31m", // Bold red
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A quick fix: a string to insert at a 1-based column of the failing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickFix {
    /// The text to insert
    pub fix: String,
    /// 1-based column in the pre-insertion line; negative counts from the
    /// end of the line, `-1` meaning "append after the last column"
    pub loc: i64,
}

/// A finished diagnostic record.
///
/// The field set matches the serialization contract used by `--emit-ast`
/// tooling: `color_mode`, `error_type`, `level`, `file`, `msg`, `fix`,
/// `line`, `col`, `offset` and `quick_fix`.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Color mode the record was rendered under
    pub color_mode: &'static str,
    /// `"code"` for source-anchored errors, `"compiler"` otherwise
    pub error_type: &'static str,
    /// Severity
    pub level: Level,
    /// Numeric error code
    pub code: u32,
    /// Path of the failing file (empty for compiler errors)
    pub file: String,
    /// Expanded message
    pub msg: String,
    /// Expanded fix suggestion (empty if none)
    pub fix: String,
    /// 1-based line of the point of failure
    pub line: u32,
    /// 1-based column of the point of failure
    pub col: u32,
    /// Length of the caret run under the point of failure
    pub offset: u32,
    /// Quick fixes to render into the failing line
    pub quick_fix: Vec<QuickFix>,
    /// Indent level for nested rendering (four spaces per level)
    #[serde(skip)]
    pub indent: u8,
    /// Whether to mark the point of failure with a caret run
    #[serde(skip)]
    pub mark_pof: bool,
}

/// An internal engine failure.
///
/// Raised when rendering needs the failing source line and the cache cannot
/// produce it; the driver maps this to the unrecoverable exit code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The failing line could not be retrieved from the source cache.
    #[error("source line {line} of `{file}` is unavailable")]
    MissingLine {
        /// File the line was requested from
        file: String,
        /// 1-based line number
        line: u32,
    },
}

/// A source-anchored error report, built with chained setters and handed to
/// [`DiagnosticEngine::report`].
#[derive(Debug, Clone)]
pub struct CodeError {
    pof: Token,
    code: u32,
    err_args: Vec<(&'static str, String)>,
    fix_args: Vec<(&'static str, String)>,
    quick_fixes: Vec<QuickFix>,
    mark_pof: bool,
    indent: u8,
    level: Option<Level>,
}

impl CodeError {
    /// Creates a report for the given point-of-failure token and code.
    #[must_use]
    pub fn new(pof: &Token, code: u32) -> Self {
        Self {
            pof: pof.clone(),
            code,
            err_args: Vec::new(),
            fix_args: Vec::new(),
            quick_fixes: Vec::new(),
            mark_pof: true,
            indent: 0,
            level: None,
        }
    }

    /// Adds a message-template argument.
    #[must_use]
    pub fn arg(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.err_args.push((name, value.into()));
        self
    }

    /// Adds a fix-template argument.
    #[must_use]
    pub fn fix_arg(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fix_args.push((name, value.into()));
        self
    }

    /// Adds a quick fix: text inserted at the given 1-based column of the
    /// failing line (negative counts from the end, `-1` appends).
    #[must_use]
    pub fn quick_fix(mut self, fix: impl Into<String>, loc: i64) -> Self {
        self.quick_fixes.push(QuickFix { fix: fix.into(), loc });
        self
    }

    /// Suppresses the caret run under the point of failure.
    #[must_use]
    pub fn without_marking(mut self) -> Self {
        self.mark_pof = false;
        self
    }

    /// Sets the render indent level.
    #[must_use]
    pub fn indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Overrides the default severity of the code.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }
}

/// Collects, renders and stores diagnostics for the lifetime of a process.
#[derive(Debug)]
pub struct DiagnosticEngine {
    cache: Arc<SourceCache>,
    errors: Mutex<Vec<Diagnostic>>,
    has_errored: AtomicBool,
    show_errors: bool,
    color: bool,
}

impl DiagnosticEngine {
    /// Creates an engine with immediate rendering enabled.
    #[must_use]
    pub fn new(cache: Arc<SourceCache>) -> Self {
        Self {
            cache,
            errors: Mutex::new(Vec::new()),
            has_errored: AtomicBool::new(false),
            show_errors: true,
            color: true,
        }
    }

    /// Creates an engine that only buffers; nothing is printed until
    /// [`DiagnosticEngine::render_all`] is called.
    #[must_use]
    pub fn buffered(cache: Arc<SourceCache>) -> Self {
        Self { show_errors: false, ..Self::new(cache) }
    }

    /// Disables ANSI coloring in rendered output.
    #[must_use]
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    /// Returns the source cache the engine resolves context lines from.
    #[must_use]
    pub fn cache(&self) -> &Arc<SourceCache> { &self.cache }

    /// Returns true if any diagnostic of level `Error` or above was reported.
    #[must_use]
    pub fn has_errored(&self) -> bool { self.has_errored.load(Ordering::Relaxed) }

    /// Returns a snapshot of the accumulated diagnostics, in report order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.lock().expect("diagnostic buffer poisoned").clone()
    }

    /// Returns the number of accumulated diagnostics.
    #[must_use]
    pub fn len(&self) -> usize { self.errors.lock().expect("diagnostic buffer poisoned").len() }

    /// Returns true if no diagnostics were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Reports a source-anchored error.
    ///
    /// Looks the code up in the table, expands the templates, resolves quick
    /// fixes against the failing line, stores the record and renders it if
    /// immediate rendering is on. Returns the effective severity so the
    /// caller can decide whether to abort its stage.
    ///
    /// ## Errors
    ///
    /// Returns [`EngineError::MissingLine`] if the failing line cannot be
    /// retrieved, which the driver treats as unrecoverable.
    ///
    /// ## Panics
    ///
    /// Panics if the code is not present in the error table; that is a bug
    /// in the caller, not a user-facing condition.
    pub fn report(&self, error: CodeError) -> Result<Level, EngineError> {
        let template = codes::lookup(error.code)
            .unwrap_or_else(|| panic!("unknown error code {}", error.code));

        let level = error.level.unwrap_or(template.level);
        let pof = &error.pof;

        let diagnostic = Diagnostic {
            color_mode: if self.color { "16bit" } else { "none" },
            error_type: "code",
            level,
            code: error.code,
            file: pof.location.file.to_string(),
            msg: codes::expand(template.message, &error.err_args),
            fix: codes::expand(template.fix, &error.fix_args),
            line: pof.location.line,
            col: pof.location.column,
            offset: pof.location.length.max(1),
            quick_fix: error.quick_fixes,
            indent: error.indent,
            mark_pof: error.mark_pof,
        };

        self.push(diagnostic)
    }

    /// Reports a stage error that is not tied to a source location.
    ///
    /// ## Panics
    ///
    /// Panics if the code is not present in the error table.
    pub fn report_compiler(
        &self,
        code: u32,
        err_args: &[(&'static str, String)],
    ) -> Level {
        let template =
            codes::lookup(code).unwrap_or_else(|| panic!("unknown error code {code}"));

        let diagnostic = Diagnostic {
            color_mode: if self.color { "16bit" } else { "none" },
            error_type: "compiler",
            level: template.level,
            code,
            file: String::new(),
            msg: codes::expand(template.message, err_args),
            fix: template.fix.to_owned(),
            line: 0,
            col: 0,
            offset: 0,
            quick_fix: Vec::new(),
            indent: 0,
            mark_pof: false,
        };

        // A compiler error has no failing line, so rendering cannot fail.
        self.push(diagnostic).unwrap_or(template.level)
    }

    fn push(&self, diagnostic: Diagnostic) -> Result<Level, EngineError> {
        let level = diagnostic.level;

        if level >= Level::Error {
            self.has_errored.store(true, Ordering::Relaxed);
        }

        let rendered = if self.show_errors {
            Some(render::render(&self.cache, &diagnostic, self.color)?)
        } else {
            None
        };

        self.errors.lock().expect("diagnostic buffer poisoned").push(diagnostic);

        if let Some(text) = rendered {
            eprintln!("{text}");
        }

        Ok(level)
    }

    /// Renders every buffered diagnostic to one string.
    ///
    /// ## Errors
    ///
    /// Returns [`EngineError::MissingLine`] if a failing line cannot be
    /// retrieved while rendering.
    pub fn render_all(&self) -> Result<String, EngineError> {
        let errors = self.errors.lock().expect("diagnostic buffer poisoned");
        let mut out = String::new();

        for diagnostic in errors.iter() {
            out.push_str(&render::render(&self.cache, diagnostic, self.color)?);
            out.push('\n');
        }

        Ok(out)
    }

    /// Serializes the buffered diagnostics as a JSON array.
    #[must_use]
    pub fn to_json(&self) -> String {
        let errors = self.errors.lock().expect("diagnostic buffer poisoned");
        serde_json::to_string_pretty(&*errors).unwrap_or_else(|_| "[]".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use hlx_source::Location;

    use super::*;
    use crate::token::TokenKind;

    fn engine_with(source: &str) -> DiagnosticEngine {
        let cache = Arc::new(SourceCache::new());
        cache.add("test.hlx", source);

        DiagnosticEngine::buffered(cache).without_color()
    }

    fn token_at(line: u32, column: u32, offset: u32, len: u32) -> Token {
        Token::new(
            TokenKind::Identifier,
            "x".repeat(len as usize),
            Location::new("test.hlx", line, column, offset, len),
        )
    }

    #[test]
    fn report_sets_has_errored_at_error_level() {
        let engine = engine_with("let x = 1;");
        assert!(!engine.has_errored());

        let level = engine
            .report(CodeError::new(&token_at(1, 5, 4, 1), 3001).arg("token", "x"))
            .unwrap();

        assert_eq!(level, Level::Error);
        assert!(engine.has_errored());
    }

    #[test]
    fn warn_does_not_set_has_errored() {
        let engine = engine_with("fn f() {}");

        let level = engine
            .report(CodeError::new(&token_at(1, 4, 3, 1), 3004).arg("name", "f"))
            .unwrap();

        assert_eq!(level, Level::Warn);
        assert!(!engine.has_errored());
    }

    #[test]
    fn diagnostics_keep_report_order() {
        let engine = engine_with("a b c\n");

        for (i, code) in [3001u32, 3002, 3003].into_iter().enumerate() {
            let tok = token_at(1, i as u32 * 2 + 1, i as u32 * 2, 1);
            let _ = engine
                .report(
                    CodeError::new(&tok, code)
                        .arg("token", "t")
                        .arg("what", "w")
                        .arg("modifier", "m")
                        .arg("decl", "d"),
                )
                .unwrap();
        }

        let codes: Vec<u32> = engine.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![3001, 3002, 3003]);
    }

    #[test]
    fn level_override_is_honored() {
        let engine = engine_with("x\n");
        let level = engine
            .report(
                CodeError::new(&token_at(1, 1, 0, 1), 3001)
                    .arg("token", "x")
                    .level(Level::Fatal),
            )
            .unwrap();

        assert_eq!(level, Level::Fatal);
    }

    #[test]
    #[should_panic(expected = "unknown error code")]
    fn unknown_code_panics() {
        let engine = engine_with("x\n");
        let _ = engine.report(CodeError::new(&token_at(1, 1, 0, 1), 31337));
    }

    #[test]
    fn compiler_error_has_no_location() {
        let engine = engine_with("");
        let _ = engine.report_compiler(2001, &[("path", "lib".to_owned())]);

        let diags = engine.diagnostics();
        assert_eq!(diags[0].error_type, "compiler");
        assert_eq!(diags[0].line, 0);
    }

    #[test]
    fn serialization_contains_contract_fields() {
        let engine = engine_with("let x = 1\n");
        let _ = engine
            .report(
                CodeError::new(&token_at(1, 9, 8, 1), 3002)
                    .arg("what", "a semicolon")
                    .fix_arg("what", ";")
                    .quick_fix(";", -1),
            )
            .unwrap();

        let json = engine.to_json();
        for field in ["color_mode", "error_type", "level", "file", "msg", "fix", "line", "col", "offset", "quick_fix"] {
            assert!(json.contains(field), "missing field {field} in {json}");
        }
    }
}
