//! CX-IR token model.
//!
//! The emitter lowers the AST into a linear sequence of [`CxToken`]s whose
//! textual concatenation is a valid C++-dialect translation unit. Tokens
//! carry the line/column/length of the source token they were lowered from,
//! so the readable rendering can point back at HLX source.

use std::fmt;
use std::sync::Arc;

use hlx_source::Location;

/// Kinds of IR tokens.
///
/// Fixed-lexeme kinds carry no payload; `Identifier`, `Literal`, `Operator`
/// and `Annotation` take their text from the token's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CxTokenKind {
    // Keywords
    Auto,
    Break,
    Case,
    Catch,
    Class,
    Concept,
    Const,
    Continue,
    CoAwait,
    CoYield,
    Default,
    Delete,
    Else,
    Enum,
    For,
    If,
    Inline,
    Namespace,
    Operator,
    Public,
    Private,
    Protected,
    Requires,
    Return,
    Static,
    StaticCast,
    Struct,
    Switch,
    Template,
    This,
    Throw,
    True,
    Try,
    Typename,
    Using,
    Void,
    While,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Less,
    Greater,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Question,
    Asterisk,
    Ampersand,
    Exclamation,
    LogicalAnd,
    ScopeResolution,
    PtrAccess,

    // Preprocessor
    PpInclude,

    // Payload-carrying kinds
    Identifier,
    Literal,
    Operator2,
    Annotation,
}

impl CxTokenKind {
    /// Returns the fixed lexeme for this kind, if it has one.
    #[must_use]
    pub const fn lexeme(&self) -> Option<&'static str> {
        let text = match self {
            Self::Auto => "auto",
            Self::Break => "break",
            Self::Case => "case",
            Self::Catch => "catch",
            Self::Class => "class",
            Self::Concept => "concept",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::CoAwait => "co_await",
            Self::CoYield => "co_yield",
            Self::Default => "default",
            Self::Delete => "delete",
            Self::Else => "else",
            Self::Enum => "enum",
            Self::For => "for",
            Self::If => "if",
            Self::Inline => "inline",
            Self::Namespace => "namespace",
            Self::Operator => "operator",
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Requires => "requires",
            Self::Return => "return",
            Self::Static => "static",
            Self::StaticCast => "static_cast",
            Self::Struct => "struct",
            Self::Switch => "switch",
            Self::Template => "template",
            Self::This => "this",
            Self::Throw => "throw",
            Self::True => "true",
            Self::Try => "try",
            Self::Typename => "typename",
            Self::Using => "using",
            Self::Void => "void",
            Self::While => "while",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Question => "?",
            Self::Asterisk => "*",
            Self::Ampersand => "&",
            Self::Exclamation => "!",
            Self::LogicalAnd => "&&",
            Self::ScopeResolution => "::",
            Self::PtrAccess => "->",
            Self::PpInclude => "#include",
            Self::Identifier | Self::Literal | Self::Operator2 | Self::Annotation => {
                return None;
            }
        };

        Some(text)
    }
}

/// One IR token: a kind, its text and the source position it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CxToken {
    /// Kind of the token
    pub kind: CxTokenKind,
    /// Text; for fixed-lexeme kinds this is the lexeme itself
    pub value: String,
    /// 1-based source line hint (0 for synthesized tokens)
    pub line: u32,
    /// 1-based source column hint
    pub column: u32,
    /// Source length hint
    pub length: u32,
    /// Source file hint
    pub file: Arc<str>,
}

/// Placeholder file name for tokens with no source counterpart.
pub const SYNTHESIZED_FILE: &str = "<hlx-codegen>";

impl CxToken {
    /// Creates a synthesized token with no source position.
    #[must_use]
    pub fn new(kind: CxTokenKind) -> Self {
        Self {
            kind,
            value: kind.lexeme().unwrap_or("").to_owned(),
            line: 0,
            column: 0,
            length: 1,
            file: Arc::from(SYNTHESIZED_FILE),
        }
    }

    /// Creates a synthesized token with an explicit value.
    #[must_use]
    pub fn with_value(kind: CxTokenKind, value: impl Into<String>) -> Self {
        Self { value: value.into(), ..Self::new(kind) }
    }

    /// Creates a token carrying the position of the source location it was
    /// lowered from.
    #[must_use]
    pub fn from_source(kind: CxTokenKind, value: impl Into<String>, loc: &Location) -> Self {
        Self {
            kind,
            value: value.into(),
            line: loc.line,
            column: loc.column,
            length: loc.length,
            file: loc.file.clone(),
        }
    }

    /// Returns true if this token was synthesized rather than lowered from
    /// a source token.
    #[must_use]
    pub fn is_synthesized(&self) -> bool { self.line == 0 }
}

impl fmt::Display for CxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.value) }
}
