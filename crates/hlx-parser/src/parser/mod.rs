//! Recursive-descent parser for the HLX language.
//!
//! The parser consumes a trivia-free [`TokenStream`] and produces the typed
//! AST defined in `hlx-ast`. Every parse routine returns a [`ParseResult`]:
//! a recoverable error has already been reported to the diagnostic engine
//! when it surfaces, and the caller resynchronizes at the next statement
//! boundary before continuing. Only internal engine failures abort parsing
//! outright.

mod declarations;
mod expressions;
mod statements;

use hlx_ast::nodes::Program;
use hlx_source::Location;
use thiserror::Error;

use crate::diagnostics::{CodeError, DiagnosticEngine, EngineError, Level};
use crate::stream::{self, TokenStream};
use crate::token::{Token, TokenKind};

/// Error type of every parse routine.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A syntax error that was already reported; the caller recovers at a
    /// synchronization point and continues.
    #[error("syntax error")]
    Syntax,
    /// An internal diagnostic-engine failure; parsing aborts.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result alias used by all parse routines.
pub type ParseResult<T> = Result<T, ParseError>;

/// The parser.
///
/// Holds the token stream, the diagnostic engine and the small amount of
/// context needed for statement dispatch: whether a class body is being
/// parsed (for `self` handling) and the namespace stack maintained across
/// `module` blocks.
#[derive(Debug)]
pub struct Parser<'e> {
    stream: TokenStream,
    engine: &'e DiagnosticEngine,
    class_depth: usize,
    namespace: Vec<String>,
    speculation: usize,
}

impl<'e> Parser<'e> {
    /// Creates a parser over a preprocessed stream.
    ///
    /// Trivia tokens are dropped here; the lexer keeps comments in the
    /// stream for `--emit-tokens`, but the grammar never sees them.
    #[must_use]
    pub fn new(stream: &TokenStream, engine: &'e DiagnosticEngine) -> Self {
        Self {
            stream: stream::without_trivia(stream),
            engine,
            class_depth: 0,
            namespace: Vec::new(),
            speculation: 0,
        }
    }

    /// Parses the whole stream into a program.
    ///
    /// Recoverable errors are pushed to the diagnostic buffer and parsing
    /// continues at the next synchronization point, bounding cascades.
    ///
    /// ## Errors
    ///
    /// Returns [`EngineError`] wrapped in [`ParseError::Engine`] only for
    /// internal failures; syntax errors never abort this entry point.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut program = Program::new(self.stream.file_name().to_owned());

        log::debug!("parsing {}", program.file);

        while !self.at_end() {
            // Stray semicolons are tolerated between top-level items.
            if self.eat(TokenKind::Semicolon).is_some() {
                continue;
            }

            match self.parse_statement() {
                Ok(stmt) => program.children.push(stmt),
                Err(ParseError::Syntax) => self.recover(),
                Err(err @ ParseError::Engine(_)) => return Err(err),
            }
        }

        if let Some(first) = program.children.first() {
            let last_loc = program.children.last().map_or_else(Location::synthesized, |stmt| {
                stmt.loc().clone()
            });
            program.loc = first.loc().span_to(&last_loc);
        }

        Ok(program)
    }

    /// Returns the diagnostic engine.
    #[must_use]
    pub fn engine(&self) -> &'e DiagnosticEngine { self.engine }

    // ---- cursor helpers -------------------------------------------------

    pub(crate) fn current(&self) -> &Token { self.stream.current() }

    pub(crate) fn current_kind(&self) -> TokenKind { self.stream.current().kind }

    pub(crate) fn peek_kind(&self, n: i64) -> Option<TokenKind> {
        self.stream.peek(n).map(|tok| tok.kind)
    }

    pub(crate) fn at_end(&self) -> bool { self.current_kind() == TokenKind::EndOfFile }

    pub(crate) fn position(&self) -> usize { self.stream.position() }

    pub(crate) fn rewind_to(&mut self, position: usize) { self.stream.set_position(position); }

    /// Returns the current token and moves past it.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.stream.current().clone();

        // Advancing past the trailing EOF is a no-op; the cursor parks there.
        let _ = self.stream.advance(1);
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool { self.current_kind() == kind }

    /// Consumes the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.check(kind).then(|| self.bump())
    }

    // ---- speculation ----------------------------------------------------

    /// Enters speculative parsing: errors are swallowed instead of
    /// reported, so a rolled-back attempt leaves no diagnostics behind.
    pub(crate) fn begin_speculation(&mut self) { self.speculation += 1; }

    /// Leaves speculative parsing.
    pub(crate) fn end_speculation(&mut self) {
        self.speculation = self.speculation.saturating_sub(1);
    }

    fn speculating(&self) -> bool { self.speculation > 0 }

    // ---- error reporting ------------------------------------------------

    /// Reports an unexpected-token error at the current token.
    pub(crate) fn unexpected(&mut self, expected: &str) -> ParseError {
        if self.speculating() {
            return ParseError::Syntax;
        }

        let token = self.current().clone();

        let report = CodeError::new(&token, 3001)
            .arg("token", token.display_value())
            .fix_arg("expected", expected);

        match self.engine.report(report) {
            Ok(_) => ParseError::Syntax,
            Err(err) => ParseError::Engine(err),
        }
    }

    /// Consumes a token of the given kind or reports an unexpected-token
    /// error.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.bump());
        }

        Err(self.unexpected(&format!("`{kind}`")))
    }

    /// Consumes a closing semicolon, or reports a missing-punctuation error
    /// pointing just past the previous token with an insertion quick fix.
    pub(crate) fn expect_semicolon(&mut self) -> ParseResult<Token> {
        if self.check(TokenKind::Semicolon) {
            return Ok(self.bump());
        }

        Err(self.missing(";", "a semicolon"))
    }

    /// Reports a missing-punctuation error anchored one column past the
    /// previous token, with the insertion offered as a quick fix.
    pub(crate) fn missing(&mut self, text: &str, what: &str) -> ParseError {
        if self.speculating() {
            return ParseError::Syntax;
        }

        let anchor = self
            .stream
            .peek(-1)
            .filter(|tok| !tok.location.is_synthesized())
            .map_or_else(|| self.current().location.clone(), |tok| tok.location.clone());

        let column = anchor.column + anchor.length;
        let pof = Token::new(
            TokenKind::Unknown,
            "",
            Location::new(
                anchor.file.clone(),
                anchor.line,
                column,
                anchor.offset + anchor.length,
                1,
            ),
        );

        let report = CodeError::new(&pof, 3002)
            .arg("what", what)
            .fix_arg("what", text)
            .quick_fix(text, i64::from(column));

        match self.engine.report(report) {
            Ok(_) => ParseError::Syntax,
            Err(err) => ParseError::Engine(err),
        }
    }

    /// Reports a code error at a specific token.
    pub(crate) fn report_at(&self, report: CodeError) -> ParseResult<Level> {
        if self.speculating() {
            return Ok(Level::Error);
        }

        self.engine.report(report).map_err(ParseError::Engine)
    }

    // ---- recovery -------------------------------------------------------

    /// Advances to the next synchronization point: the next `;` at the
    /// current brace depth, or the closing brace of the enclosing block.
    /// The terminator itself is consumed for `;`, left in place for `}`.
    pub(crate) fn recover(&mut self) {
        let mut depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::Semicolon if depth == 0 => {
                    let _ = self.bump();
                    return;
                }
                TokenKind::OpenBrace => {
                    depth += 1;
                    let _ = self.bump();
                }
                TokenKind::CloseBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    let _ = self.bump();
                }
                _ => {
                    let _ = self.bump();
                }
            }
        }
    }

    // ---- context --------------------------------------------------------

    pub(crate) fn in_class_body(&self) -> bool { self.class_depth > 0 }

    pub(crate) fn enter_class(&mut self) { self.class_depth += 1; }

    pub(crate) fn exit_class(&mut self) {
        self.class_depth = self.class_depth.saturating_sub(1);
    }

    /// Pushes a module segment; empty for anonymous modules.
    pub(crate) fn push_namespace(&mut self, segment: String) { self.namespace.push(segment); }

    pub(crate) fn pop_namespace(&mut self) { let _ = self.namespace.pop(); }

    /// Depth of the namespace stack, exposed for balance checks.
    #[must_use]
    pub fn namespace_depth(&self) -> usize { self.namespace.len() }
}
