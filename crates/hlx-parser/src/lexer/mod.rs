//! Lexer for the HLX language.
//!
//! A single forward pass over the source bytes, maintaining line, column and
//! byte-offset counters. Every token's value is the byte-exact slice of the
//! source it was scanned from.
//!
//! The scanner is hand-written: the token grammar includes nested block
//! comments, balanced `#[...]` compiler-directive spans and ABI-prefixed
//! string literals, and the preprocessor re-lexes formatted-string fragments
//! with a positional override — none of which fit a regular lexer
//! definition.

use std::sync::Arc;

use hlx_source::Location;

use crate::diagnostics::{CodeError, DiagnosticEngine, EngineError, Level};
use crate::stream::TokenStream;
use crate::token::{OPERATORS, PUNCTUATION, Token, TokenKind};

/// Bytes that may prefix a string literal (`r"..."`, `b"..."`, `u"..."`,
/// `f"..."`). The `f` variant designates a formatted string; the others are
/// uninterpreted prefixes retained in the token value.
const STRING_PREFIXES: &[u8] = b"rbuf";

/// The scanner.
///
/// Positions: `line` increments on `\n` and `column` resets to 1; `offset`
/// is the byte offset into the source. A carriage return is counted as part
/// of the preceding line.
#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    file: Arc<str>,
    pos: usize,
    line: u32,
    column: u32,
    base_offset: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer for one file's source text.
    #[must_use]
    pub fn new(source: &'src str, file: impl Into<Arc<str>>) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            file: file.into(),
            pos: 0,
            line: 1,
            column: 1,
            base_offset: 0,
        }
    }

    /// Creates a lexer with a starting override for (line, column, offset).
    ///
    /// Used to re-lex a fragment of an already-lexed file (formatted-string
    /// contents) so the produced tokens keep their original positions.
    #[must_use]
    pub fn with_start(
        source: &'src str,
        file: impl Into<Arc<str>>,
        line: u32,
        column: u32,
        offset: u32,
    ) -> Self {
        let mut lexer = Self::new(source, file);
        lexer.line = line;
        lexer.column = column;
        lexer.pos = 0;

        // The offset override shifts every token's recorded offset; the
        // source slice passed in starts at `offset` within the real file.
        lexer.base_offset = offset;
        lexer
    }

    /// Runs the scan, producing a stream terminated by an EOF token.
    ///
    /// Tokens for whitespace are not materialized; comments are. A fatal
    /// diagnostic (unterminated literal or comment, unknown byte) ends the
    /// pass; the partial stream is still returned so later stages can report
    /// against it.
    ///
    /// ## Errors
    ///
    /// Returns [`EngineError`] if diagnostic rendering fails, which the
    /// driver treats as unrecoverable.
    pub fn tokenize(mut self, engine: &DiagnosticEngine) -> Result<TokenStream, EngineError> {
        let mut stream = TokenStream::new(Arc::clone(&self.file));

        log::debug!("lexing {} ({} bytes)", self.file, self.source.len());

        while let Some(byte) = self.current() {
            let fatal = match byte {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.bump();
                    None
                }
                b'/' if self.peek(1) == Some(b'/') => {
                    stream.push(self.scan_line_comment());
                    None
                }
                b'/' if self.peek(1) == Some(b'*') => match self.scan_block_comment() {
                    Ok(token) => {
                        stream.push(token);
                        None
                    }
                    Err(error) => Some(engine.report(error)?),
                },
                b'"' | b'\'' => match self.scan_string(false) {
                    Ok(token) => {
                        stream.push(token);
                        None
                    }
                    Err(error) => Some(engine.report(error)?),
                },
                b'0'..=b'9' => {
                    stream.push(self.scan_number());
                    None
                }
                _ if STRING_PREFIXES.contains(&byte)
                    && matches!(self.peek(1), Some(b'"' | b'\'')) =>
                {
                    match self.scan_string(true) {
                        Ok(token) => {
                            stream.push(token);
                            None
                        }
                        Err(error) => Some(engine.report(error)?),
                    }
                }
                b'_' | b'a'..=b'z' | b'A'..=b'Z' => {
                    stream.push(self.scan_identifier());
                    None
                }
                b'#' if self.peek(1) == Some(b'[') => {
                    stream.push(self.scan_directive());
                    None
                }
                _ => match self.scan_operator_or_punctuation() {
                    Ok(token) => {
                        stream.push(token);
                        None
                    }
                    Err(error) => Some(engine.report(error)?),
                },
            };

            if fatal == Some(Level::Fatal) {
                break;
            }
        }

        stream.push(Token::end_of_file(self.here(0)));
        Ok(stream)
    }

    /// Location of length `len` at the current position.
    fn here(&self, len: u32) -> Location {
        Location::new(
            Arc::clone(&self.file),
            self.line,
            self.column,
            self.base_offset + self.pos as u32,
            len,
        )
    }

    fn current(&self) -> Option<u8> { self.bytes.get(self.pos).copied() }

    fn peek(&self, n: usize) -> Option<u8> { self.bytes.get(self.pos + n).copied() }

    /// Consumes one byte, updating the position counters.
    fn bump(&mut self) {
        if let Some(byte) = self.current() {
            self.pos += 1;

            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Builds a token for the bytes scanned since `start`.
    fn token_from(
        &self,
        kind: TokenKind,
        start: usize,
        start_line: u32,
        start_column: u32,
    ) -> Token {
        let value = &self.source[start..self.pos];
        let location = Location::new(
            Arc::clone(&self.file),
            start_line,
            start_column,
            self.base_offset + start as u32,
            (self.pos - start) as u32,
        );

        Token::new(kind, value, location)
    }

    fn scan_line_comment(&mut self) -> Token {
        let (start, line, column) = (self.pos, self.line, self.column);

        while let Some(byte) = self.current() {
            if byte == b'\n' {
                break;
            }
            self.bump();
        }

        self.token_from(TokenKind::SingleLineComment, start, line, column)
    }

    /// Scans a nesting block comment: each `/*` increments the depth, each
    /// `*/` decrements it; the token ends when the depth returns to zero.
    fn scan_block_comment(&mut self) -> Result<Token, CodeError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        let mut depth = 0usize;

        while let Some(byte) = self.current() {
            match (byte, self.peek(1)) {
                (b'/', Some(b'*')) => {
                    depth += 1;
                    self.bump();
                    self.bump();
                }
                (b'*', Some(b'/')) => {
                    depth -= 1;
                    self.bump();
                    self.bump();

                    if depth == 0 {
                        return Ok(self.token_from(
                            TokenKind::MultiLineComment,
                            start,
                            line,
                            column,
                        ));
                    }
                }
                _ => self.bump(),
            }
        }

        let pof = Token::new(
            TokenKind::Unknown,
            &self.source[start..(start + 2).min(self.source.len())],
            Location::new(Arc::clone(&self.file), line, column, self.base_offset + start as u32, 2),
        );

        Err(CodeError::new(&pof, 1003))
    }

    /// Scans a string or char literal, honoring `\` escapes and an optional
    /// single-letter ABI prefix.
    fn scan_string(&mut self, prefixed: bool) -> Result<Token, CodeError> {
        let (start, line, column) = (self.pos, self.line, self.column);

        if prefixed {
            self.bump();
        }

        let quote = self.current().unwrap_or(b'"');
        self.bump();

        while let Some(byte) = self.current() {
            if byte == b'\\' {
                self.bump();
                self.bump();
                continue;
            }

            if byte == quote {
                self.bump();

                let kind = if quote == b'"' {
                    TokenKind::StringLiteral
                } else {
                    TokenKind::CharLiteral
                };

                return Ok(self.token_from(kind, start, line, column));
            }

            self.bump();
        }

        let pof = Token::new(
            TokenKind::Unknown,
            &self.source[start..(start + 1).min(self.source.len())],
            Location::new(Arc::clone(&self.file), line, column, self.base_offset + start as u32, 1),
        );

        let kind = if quote == b'"' { "string" } else { "char" };

        Err(CodeError::new(&pof, 1002)
            .arg("kind", kind)
            .fix_arg("quote", (quote as char).to_string()))
    }

    /// Scans a numeric literal.
    ///
    /// After the first digit the scan accepts digits, hex letters, radix and
    /// exponent markers and `_`; a sign is only taken directly after an
    /// exponent marker, and a `.` is only taken when a digit follows, so
    /// `0..10` stays three tokens. Strict numeric validation is not the
    /// lexer's job.
    fn scan_number(&mut self) -> Token {
        let (start, line, column) = (self.pos, self.line, self.column);
        let mut is_float = false;

        self.bump();

        while let Some(byte) = self.current() {
            match byte {
                b'0'..=b'9'
                | b'a'..=b'f'
                | b'A'..=b'F'
                | b'_'
                | b'x'
                | b'X'
                | b'o'
                | b'O' => self.bump(),
                b'+' | b'-' => {
                    if matches!(self.bytes.get(self.pos - 1), Some(b'e' | b'E')) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                b'.' => {
                    if matches!(self.peek(1), Some(b'0'..=b'9')) {
                        is_float = true;
                        self.bump();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }

        let kind = if is_float { TokenKind::FloatLiteral } else { TokenKind::IntLiteral };
        self.token_from(kind, start, line, column)
    }

    fn scan_identifier(&mut self) -> Token {
        let (start, line, column) = (self.pos, self.line, self.column);

        while let Some(byte) = self.current() {
            match byte {
                b'_' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => self.bump(),
                _ => break,
            }
        }

        let text = &self.source[start..self.pos];
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);

        self.token_from(kind, start, line, column)
    }

    /// Scans a `#[...]` compiler directive as one token, tracking bracket
    /// balance. A newline ends the span early; `# [...]` is not a directive.
    fn scan_directive(&mut self) -> Token {
        let (start, line, column) = (self.pos, self.line, self.column);
        let mut depth = 0usize;

        self.bump(); // '#'

        while let Some(byte) = self.current() {
            match byte {
                b'[' => {
                    depth += 1;
                    self.bump();
                }
                b']' => {
                    depth -= 1;
                    self.bump();

                    if depth == 0 {
                        break;
                    }
                }
                b'\n' => break,
                _ => self.bump(),
            }
        }

        self.token_from(TokenKind::CompilerDirective, start, line, column)
    }

    /// Greedily matches the longest operator, falling back to single-byte
    /// punctuation. Anything else is an unknown-character fatal.
    fn scan_operator_or_punctuation(&mut self) -> Result<Token, CodeError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        let rest = &self.source[self.pos..];

        for (text, kind) in OPERATORS {
            if rest.starts_with(text) {
                for _ in 0..text.len() {
                    self.bump();
                }
                return Ok(self.token_from(*kind, start, line, column));
            }
        }

        for (text, kind) in PUNCTUATION {
            if rest.starts_with(text) {
                self.bump();
                return Ok(self.token_from(*kind, start, line, column));
            }
        }

        let bad = self.source[self.pos..].chars().next().unwrap_or('\u{fffd}');
        self.bump();

        let pof = Token::new(
            TokenKind::Unknown,
            bad.to_string(),
            Location::new(
                Arc::clone(&self.file),
                line,
                column,
                self.base_offset + start as u32,
                bad.len_utf8() as u32,
            ),
        );

        Err(CodeError::new(&pof, 1001).arg("char", bad.to_string()))
    }
}

#[cfg(test)]
mod tests;
