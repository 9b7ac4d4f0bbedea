//! Token definitions for the HLX language.
//!
//! This module defines the token kinds recognized by the lexer, the keyword
//! and operator string tables, and the [`Token`] value type carrying a kind,
//! its raw text and a source location.

use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

use hlx_source::Location;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Represents the kind of a token in the HLX language.
///
/// This enum contains every token kind produced by the lexer:
///
/// - Keywords like `fn`, `let`, `class`, `module`
/// - Literals (integer, float, string, char, boolean, null)
/// - Operators and punctuation
/// - Trivia kinds (whitespace, comments) and the synthetic end-of-file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Declaration keywords
    Fn,
    Let,
    Const,
    Class,
    Struct,
    Enum,
    Interface,
    Type,
    Ffi,
    Op,
    Module,
    Import,
    Define,
    Macro,
    Using,
    Requires,

    // Control-flow keywords
    If,
    Else,
    Unless,
    Switch,
    Case,
    Default,
    Fallthrough,
    For,
    While,
    In,
    Yield,
    Delete,
    Alias,
    Return,
    Break,
    Continue,
    Try,
    Catch,
    Finally,
    Panic,

    // Concurrency keywords
    Async,
    Await,
    Spawn,
    Thread,

    // Modifier keywords
    Static,
    Inline,
    Eval,
    Public,
    Private,
    Protected,
    Internal,

    // Expression keywords
    Has,
    Derives,
    As,

    // Literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    True,
    False,
    Null,

    // Identifiers
    Identifier,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    LeftShift,
    RightShift,
    LogicalAnd,
    LogicalOr,
    LogicalNot,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    PowerAssign,
    AmpersandAssign,
    PipeAssign,
    CaretAssign,
    LeftShiftAssign,
    RightShiftAssign,
    Scope,
    Arrow,
    FatArrow,
    Range,
    RangeInclusive,
    QuestionMark,

    // Punctuation
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Hash,

    // Trivia and specials
    Whitespace,
    SingleLineComment,
    MultiLineComment,
    CompilerDirective,
    EndOfFile,
    Unknown,
}

/// Keyword table: lexeme to kind, in lookup order.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("alias", TokenKind::Alias),
    ("as", TokenKind::As),
    ("async", TokenKind::Async),
    ("await", TokenKind::Await),
    ("break", TokenKind::Break),
    ("case", TokenKind::Case),
    ("catch", TokenKind::Catch),
    ("class", TokenKind::Class),
    ("const", TokenKind::Const),
    ("continue", TokenKind::Continue),
    ("default", TokenKind::Default),
    ("define", TokenKind::Define),
    ("delete", TokenKind::Delete),
    ("derives", TokenKind::Derives),
    ("else", TokenKind::Else),
    ("enum", TokenKind::Enum),
    ("eval", TokenKind::Eval),
    ("fallthrough", TokenKind::Fallthrough),
    ("false", TokenKind::False),
    ("ffi", TokenKind::Ffi),
    ("finally", TokenKind::Finally),
    ("fn", TokenKind::Fn),
    ("for", TokenKind::For),
    ("has", TokenKind::Has),
    ("if", TokenKind::If),
    ("import", TokenKind::Import),
    ("in", TokenKind::In),
    ("inline", TokenKind::Inline),
    ("interface", TokenKind::Interface),
    ("internal", TokenKind::Internal),
    ("let", TokenKind::Let),
    ("macro", TokenKind::Macro),
    ("module", TokenKind::Module),
    ("null", TokenKind::Null),
    ("op", TokenKind::Op),
    ("panic", TokenKind::Panic),
    ("private", TokenKind::Private),
    ("protected", TokenKind::Protected),
    ("public", TokenKind::Public),
    ("requires", TokenKind::Requires),
    ("return", TokenKind::Return),
    ("spawn", TokenKind::Spawn),
    ("static", TokenKind::Static),
    ("struct", TokenKind::Struct),
    ("switch", TokenKind::Switch),
    ("thread", TokenKind::Thread),
    ("true", TokenKind::True),
    ("try", TokenKind::Try),
    ("type", TokenKind::Type),
    ("unless", TokenKind::Unless),
    ("using", TokenKind::Using),
    ("while", TokenKind::While),
    ("yield", TokenKind::Yield),
];

/// Operator table, longest lexemes first so the lexer can match greedily.
pub const OPERATORS: &[(&str, TokenKind)] = &[
    ("<<=", TokenKind::LeftShiftAssign),
    (">>=", TokenKind::RightShiftAssign),
    ("**=", TokenKind::PowerAssign),
    ("..=", TokenKind::RangeInclusive),
    ("==", TokenKind::Equal),
    ("!=", TokenKind::NotEqual),
    (">=", TokenKind::GreaterEqual),
    ("<=", TokenKind::LessEqual),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("*=", TokenKind::StarAssign),
    ("/=", TokenKind::SlashAssign),
    ("%=", TokenKind::PercentAssign),
    ("&=", TokenKind::AmpersandAssign),
    ("|=", TokenKind::PipeAssign),
    ("^=", TokenKind::CaretAssign),
    ("&&", TokenKind::LogicalAnd),
    ("||", TokenKind::LogicalOr),
    ("**", TokenKind::Power),
    ("<<", TokenKind::LeftShift),
    (">>", TokenKind::RightShift),
    ("::", TokenKind::Scope),
    ("->", TokenKind::Arrow),
    ("=>", TokenKind::FatArrow),
    ("..", TokenKind::Range),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Ampersand),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::LogicalNot),
    ("=", TokenKind::Assign),
    (">", TokenKind::GreaterThan),
    ("<", TokenKind::LessThan),
    ("?", TokenKind::QuestionMark),
];

/// Punctuation table: single-byte lexemes, one token each.
pub const PUNCTUATION: &[(&str, TokenKind)] = &[
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    ("[", TokenKind::OpenBracket),
    ("]", TokenKind::CloseBracket),
    ("{", TokenKind::OpenBrace),
    ("}", TokenKind::CloseBrace),
    (",", TokenKind::Comma),
    (";", TokenKind::Semicolon),
    (":", TokenKind::Colon),
    (".", TokenKind::Dot),
    ("#", TokenKind::Hash),
];

/// The set of bytes that may start or continue an operator lexeme.
pub const OPERATOR_BYTES: &[u8] = b"+-*/%&|^~!=<>?.:";

fn keyword_map() -> &'static FxHashMap<&'static str, TokenKind> {
    static MAP: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();
    MAP.get_or_init(|| KEYWORDS.iter().copied().collect())
}

impl TokenKind {
    /// Looks up a lexeme in the keyword table.
    #[must_use]
    pub fn keyword(lexeme: &str) -> Option<Self> { keyword_map().get(lexeme).copied() }

    /// Returns the canonical lexeme for this kind, if it has one.
    ///
    /// Literal, identifier and trivia kinds have no fixed lexeme and return
    /// `None`; synthesizing a bare token for them requires an explicit value.
    #[must_use]
    pub fn lexeme(&self) -> Option<&'static str> {
        if let Some((text, _)) = KEYWORDS.iter().find(|(_, kind)| kind == self) {
            return Some(text);
        }

        if let Some((text, _)) = OPERATORS.iter().find(|(_, kind)| kind == self) {
            return Some(text);
        }

        if let Some((text, _)) = PUNCTUATION.iter().find(|(_, kind)| kind == self) {
            return Some(text);
        }

        None
    }

    /// Checks whether this kind is a keyword.
    #[must_use]
    pub fn is_keyword(&self) -> bool { KEYWORDS.iter().any(|(_, kind)| kind == self) }

    /// Checks whether this kind is a literal.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::FloatLiteral
                | Self::StringLiteral
                | Self::CharLiteral
                | Self::True
                | Self::False
                | Self::Null
        )
    }

    /// Checks whether this kind is an operator.
    #[must_use]
    pub fn is_operator(&self) -> bool { OPERATORS.iter().any(|(_, kind)| kind == self) }

    /// Checks whether this kind is trivia (whitespace or a comment).
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        matches!(self, Self::Whitespace | Self::SingleLineComment | Self::MultiLineComment)
    }

    /// Checks whether this kind may appear in a modifier bag.
    #[must_use]
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Self::Public
                | Self::Private
                | Self::Protected
                | Self::Internal
                | Self::Static
                | Self::Inline
                | Self::Async
                | Self::Const
                | Self::Eval
                | Self::Ffi
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.lexeme() {
            return write!(f, "{text}");
        }

        match self {
            Self::IntLiteral => write!(f, "<int>"),
            Self::FloatLiteral => write!(f, "<float>"),
            Self::StringLiteral => write!(f, "<string>"),
            Self::CharLiteral => write!(f, "<char>"),
            Self::Identifier => write!(f, "<identifier>"),
            Self::Whitespace => write!(f, "< >"),
            Self::SingleLineComment => write!(f, "<comment>"),
            Self::MultiLineComment => write!(f, "<block comment>"),
            Self::CompilerDirective => write!(f, "<compiler directive>"),
            Self::EndOfFile => write!(f, "<eof>"),
            Self::Unknown => write!(f, "<unknown>"),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// A single lexical unit: a kind, its raw text and where it came from.
///
/// Tokens are value types; equality is structural over all fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The raw text of the token as it appears in the source
    pub value: String,
    /// The source location of the token
    #[serde(rename = "loc")]
    pub location: Location,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, location: Location) -> Self {
        Self { kind, value: value.into(), location }
    }

    /// Creates a bare token for synthesis: kind and value only, location
    /// zeroed.
    ///
    /// Kinds with a canonical lexeme get it as their value; others get the
    /// empty string unless a value is supplied via [`Token::bare_with_value`].
    #[must_use]
    pub fn bare(kind: TokenKind) -> Self {
        Self {
            kind,
            value: kind.lexeme().unwrap_or("").to_owned(),
            location: Location::synthesized(),
        }
    }

    /// Creates a bare token with an explicit value.
    #[must_use]
    pub fn bare_with_value(kind: TokenKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into(), location: Location::synthesized() }
    }

    /// Creates the end-of-file token for a file.
    #[must_use]
    pub fn end_of_file(location: Location) -> Self {
        Self { kind: TokenKind::EndOfFile, value: String::new(), location }
    }

    /// Checks if the token is of the specified kind.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool { self.kind == kind }

    /// Returns the lexeme of a string or char literal without the
    /// surrounding quotes and without any ABI prefix letter.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        if !matches!(self.kind, TokenKind::StringLiteral | TokenKind::CharLiteral) {
            return &self.value;
        }

        let text = self.value.as_str();
        let start = text.find(['"', '\'']).unwrap_or(0);
        let inner = &text[start..];

        inner
            .strip_prefix(['"', '\''])
            .and_then(|rest| rest.strip_suffix(['"', '\'']))
            .unwrap_or(inner)
    }

    /// Returns the ABI-string prefix of a string literal (`r`, `b`, `u` or
    /// `f`), if any.
    #[must_use]
    pub fn string_prefix(&self) -> Option<char> {
        if self.kind != TokenKind::StringLiteral {
            return None;
        }

        let first = self.value.chars().next()?;
        (first != '"' && first != '\'').then_some(first)
    }

    /// Checks whether this is a formatted string literal (`f"..."`).
    #[must_use]
    pub fn is_format_string(&self) -> bool { self.string_prefix() == Some('f') }

    /// Renders the token for insertion into a diagnostic message.
    #[must_use]
    pub fn display_value(&self) -> String {
        if self.value.is_empty() { self.kind.to_string() } else { self.value.clone() }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(TokenKind::keyword("fn"), Some(TokenKind::Fn));
        assert_eq!(TokenKind::keyword("module"), Some(TokenKind::Module));
        assert_eq!(TokenKind::keyword("frobnicate"), None);
    }

    #[test]
    fn operator_table_is_longest_first() {
        let mut last = usize::MAX;
        for (text, _) in OPERATORS {
            assert!(text.len() <= last, "operator table must be sorted longest-first");
            last = text.len();
        }
    }

    #[test]
    fn bare_token_has_zeroed_location() {
        let tok = Token::bare(TokenKind::Semicolon);
        assert_eq!(tok.value, ";");
        assert!(tok.location.is_synthesized());
    }

    #[test]
    fn structural_equality() {
        let loc = Location::new("x.hlx", 1, 1, 0, 2);
        let a = Token::new(TokenKind::Identifier, "ab", loc.clone());
        let b = Token::new(TokenKind::Identifier, "ab", loc.clone());
        let c = Token::new(TokenKind::Identifier, "ab", loc.with_length(3));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unquoted_strips_quotes_and_prefix() {
        let loc = Location::synthesized();
        let plain = Token::new(TokenKind::StringLiteral, "\"hello\"", loc.clone());
        let prefixed = Token::new(TokenKind::StringLiteral, "f\"x = {x}\"", loc.clone());
        let ch = Token::new(TokenKind::CharLiteral, "'a'", loc);

        assert_eq!(plain.unquoted(), "hello");
        assert_eq!(prefixed.unquoted(), "x = {x}");
        assert!(prefixed.is_format_string());
        assert_eq!(ch.unquoted(), "a");
    }
}
