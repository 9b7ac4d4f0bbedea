//! Expression node types.

use std::fmt;

use hlx_source::Location;
use serde::Serialize;

use super::statements::SuiteStmt;
use super::types::Ty;

/// The closed set of expression variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(LiteralExpr),
    Ident(IdentExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    NamedArg(NamedArgExpr),
    Scope(ScopePathExpr),
    Dot(DotPathExpr),
    Index(IndexExpr),
    Call(CallExpr),
    ArrayLiteral(ArrayLiteralExpr),
    TupleLiteral(TupleLiteralExpr),
    SetLiteral(SetLiteralExpr),
    MapLiteral(MapLiteralExpr),
    ObjInit(ObjInitExpr),
    Lambda(LambdaExpr),
    Ternary(TernaryExpr),
    Paren(ParenExpr),
    Cast(CastExpr),
    InstOf(InstOfExpr),
    Async(AsyncExpr),
    Type(TypeExpr),
}

impl Expr {
    /// Returns the token range this expression covers.
    #[must_use]
    pub fn loc(&self) -> &Location {
        match self {
            Self::Literal(node) => &node.loc,
            Self::Ident(node) => &node.loc,
            Self::Unary(node) => &node.loc,
            Self::Binary(node) => &node.loc,
            Self::NamedArg(node) => &node.loc,
            Self::Scope(node) => &node.loc,
            Self::Dot(node) => &node.loc,
            Self::Index(node) => &node.loc,
            Self::Call(node) => &node.loc,
            Self::ArrayLiteral(node) => &node.loc,
            Self::TupleLiteral(node) => &node.loc,
            Self::SetLiteral(node) => &node.loc,
            Self::MapLiteral(node) => &node.loc,
            Self::ObjInit(node) => &node.loc,
            Self::Lambda(node) => &node.loc,
            Self::Ternary(node) => &node.loc,
            Self::Paren(node) => &node.loc,
            Self::Cast(node) => &node.loc,
            Self::InstOf(node) => &node.loc,
            Self::Async(node) => &node.loc,
            Self::Type(node) => &node.loc,
        }
    }

    /// Returns the variant tag as a name, for debug output.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Literal(_) => "LiteralExpr",
            Self::Ident(_) => "IdentExpr",
            Self::Unary(_) => "UnaryExpr",
            Self::Binary(_) => "BinaryExpr",
            Self::NamedArg(_) => "NamedArgExpr",
            Self::Scope(_) => "ScopePathExpr",
            Self::Dot(_) => "DotPathExpr",
            Self::Index(_) => "IndexExpr",
            Self::Call(_) => "CallExpr",
            Self::ArrayLiteral(_) => "ArrayLiteralExpr",
            Self::TupleLiteral(_) => "TupleLiteralExpr",
            Self::SetLiteral(_) => "SetLiteralExpr",
            Self::MapLiteral(_) => "MapLiteralExpr",
            Self::ObjInit(_) => "ObjInitExpr",
            Self::Lambda(_) => "LambdaExpr",
            Self::Ternary(_) => "TernaryExpr",
            Self::Paren(_) => "ParenExpr",
            Self::Cast(_) => "CastExpr",
            Self::InstOf(_) => "InstOfExpr",
            Self::Async(_) => "AsyncExpr",
            Self::Type(_) => "TypeExpr",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.tag()) }
}

/// Which literal subtype a [`LiteralExpr`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiteralKind {
    Int,
    Float,
    Str,
    Char,
    Bool,
    Null,
}

/// A literal value, stored as its raw source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub value: String,
    pub loc: Location,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentExpr {
    pub name: String,
    pub loc: Location,
}

impl IdentExpr {
    /// Creates an identifier node.
    #[must_use]
    pub fn new(name: impl Into<String>, loc: Location) -> Self {
        Self { name: name.into(), loc }
    }
}

/// Whether a unary operator was written before or after its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryFixity {
    Prefix,
    Postfix,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `~`
    BitNot,
    /// `&`
    Ref,
    /// `*`
    Deref,
    /// `?` (postfix)
    Question,
}

impl UnaryOp {
    /// Returns the operator lexeme.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
            Self::BitNot => "~",
            Self::Ref => "&",
            Self::Deref => "*",
            Self::Question => "?",
        }
    }
}

/// A unary operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub fixity: UnaryFixity,
    pub operand: Box<Expr>,
    pub loc: Location,
}

/// Binary operators, in source form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Pow,
    Add,
    Sub,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    And,
    Or,
    Range,
    RangeInclusive,
}

impl BinaryOp {
    /// Returns the operator lexeme.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::Add => "+",
            Self::Sub => "-",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::PowAssign => "**=",
            Self::BitAndAssign => "&=",
            Self::BitOrAssign => "|=",
            Self::BitXorAssign => "^=",
            Self::ShlAssign => "<<=",
            Self::ShrAssign => ">>=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Range => "..",
            Self::RangeInclusive => "..=",
        }
    }

    /// Returns the precedence level; higher binds tighter.
    ///
    /// All binary operators are left-associative at their own level.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Mod | Self::Pow => 5,
            Self::Add | Self::Sub => 4,
            Self::BitAnd | Self::BitOr | Self::BitXor | Self::Shl | Self::Shr => 3,
            Self::Eq | Self::Ne | Self::Gt | Self::Lt | Self::Ge | Self::Le => 2,
            _ => 1,
        }
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
    pub loc: Location,
}

/// A named argument (`name = value`), used in calls and object
/// initializers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedArgExpr {
    pub name: IdentExpr,
    pub value: Box<Expr>,
    pub loc: Location,
}

/// A scope-resolved path (`a::b::c`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopePathExpr {
    pub segments: Vec<IdentExpr>,
    pub loc: Location,
}

impl ScopePathExpr {
    /// Returns the final segment.
    ///
    /// ## Panics
    ///
    /// Panics if the path has no segments; the parser never produces one.
    #[must_use]
    pub fn last(&self) -> &IdentExpr {
        self.segments.last().expect("scope path with no segments")
    }

    /// Renders the path with `::` separators.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.name.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// A member access (`value.field`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DotPathExpr {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub loc: Location,
}

/// An array access (`value[index]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexExpr {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub loc: Location,
}

/// A generic invocation (`<T, U>`) following a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericInvokeExpr {
    pub args: Vec<Ty>,
    pub loc: Location,
}

/// A call: path, optional generic invocation, argument list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpr {
    pub path: Box<Expr>,
    pub generics: Option<GenericInvokeExpr>,
    pub args: Vec<Expr>,
    pub loc: Location,
}

/// An array literal (`[a, b, c]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayLiteralExpr {
    pub values: Vec<Expr>,
    pub loc: Location,
}

/// A tuple literal (`(a, b)`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleLiteralExpr {
    pub values: Vec<Expr>,
    pub loc: Location,
}

/// A set literal (`{a, b}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetLiteralExpr {
    pub values: Vec<Expr>,
    pub loc: Location,
}

/// One `key: value` pair of a map literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPairExpr {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
    pub loc: Location,
}

/// A map literal (`{k: v, ...}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLiteralExpr {
    pub pairs: Vec<MapPairExpr>,
    pub loc: Location,
}

/// An object initializer (`{.field = value, ...}`), optionally prefixed by
/// the type being initialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjInitExpr {
    pub path: Option<Box<Expr>>,
    pub fields: Vec<NamedArgExpr>,
    pub loc: Location,
}

/// A lambda (`fn (params) -> body`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaExpr {
    pub params: Vec<IdentExpr>,
    pub body: Box<SuiteStmt>,
    pub loc: Location,
}

/// Which surface form a ternary was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TernaryKind {
    /// `cond ? a : b`
    Question,
    /// `a if cond else b`
    IfElse,
}

/// A ternary conditional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TernaryExpr {
    pub kind: TernaryKind,
    pub condition: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
    pub loc: Location,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParenExpr {
    pub value: Box<Expr>,
    pub loc: Location,
}

/// A cast (`value as T`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastExpr {
    pub value: Box<Expr>,
    pub ty: Ty,
    pub loc: Location,
}

/// Instance-test operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstOfOp {
    /// `value has T`
    Has,
    /// `value derives T`
    Derives,
}

/// An instance test (`value has T`, `value derives T`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstOfExpr {
    pub value: Box<Expr>,
    pub op: InstOfOp,
    pub ty: Ty,
    pub loc: Location,
}

/// Asynchronous operations on an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AsyncKind {
    Await,
    Spawn,
    Thread,
}

/// An `await` / `spawn` / `thread` expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsyncExpr {
    pub kind: AsyncKind,
    pub value: Box<Expr>,
    pub loc: Location,
}

/// A type used in expression position (generic arguments, casts parsed as
/// expressions).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeExpr {
    pub ty: Box<Ty>,
    pub loc: Location,
}
