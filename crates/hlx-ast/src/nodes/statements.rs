//! Statement node types.

use std::fmt;

use hlx_source::Location;
use serde::Serialize;

use super::annotations::Annotation;
use super::declarations::Decl;
use super::expressions::{Expr, IdentExpr};
use super::types::Ty;

/// The closed set of statement variants.
///
/// Declarations appearing in statement position are carried by the
/// [`Stmt::Decl`] bridge variant so blocks own their children uniformly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    For(ForStmt),
    While(WhileStmt),
    If(IfStmt),
    Switch(SwitchStmt),
    SwitchCase(SwitchCaseStmt),
    Yield(YieldStmt),
    Delete(DeleteStmt),
    Alias(AliasStmt),
    SingleImport(SingleImportStmt),
    MultiImport(MultiImportStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Block(BlockStmt),
    Suite(SuiteStmt),
    Try(TryStmt),
    Panic(PanicStmt),
    Expr(ExprStmt),
    Decl(Box<Decl>),
    Annotation(Annotation),
}

impl Stmt {
    /// Returns the token range this statement covers.
    #[must_use]
    pub fn loc(&self) -> &Location {
        match self {
            Self::For(node) => &node.loc,
            Self::While(node) => &node.loc,
            Self::If(node) => &node.loc,
            Self::Switch(node) => &node.loc,
            Self::SwitchCase(node) => &node.loc,
            Self::Yield(node) => &node.loc,
            Self::Delete(node) => &node.loc,
            Self::Alias(node) => &node.loc,
            Self::SingleImport(node) => &node.loc,
            Self::MultiImport(node) => &node.loc,
            Self::Return(node) => &node.loc,
            Self::Break(node) => &node.loc,
            Self::Continue(node) => &node.loc,
            Self::Block(node) => &node.loc,
            Self::Suite(node) => &node.loc,
            Self::Try(node) => &node.loc,
            Self::Panic(node) => &node.loc,
            Self::Expr(node) => &node.loc,
            Self::Decl(node) => node.loc(),
            Self::Annotation(node) => node.loc(),
        }
    }

    /// Returns the variant tag as a name, for debug output.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::For(_) => "ForStmt",
            Self::While(_) => "WhileStmt",
            Self::If(_) => "IfStmt",
            Self::Switch(_) => "SwitchStmt",
            Self::SwitchCase(_) => "SwitchCaseStmt",
            Self::Yield(_) => "YieldStmt",
            Self::Delete(_) => "DeleteStmt",
            Self::Alias(_) => "AliasStmt",
            Self::SingleImport(_) => "SingleImportStmt",
            Self::MultiImport(_) => "MultiImportStmt",
            Self::Return(_) => "ReturnStmt",
            Self::Break(_) => "BreakStmt",
            Self::Continue(_) => "ContinueStmt",
            Self::Block(_) => "BlockStmt",
            Self::Suite(_) => "SuiteStmt",
            Self::Try(_) => "TryStmt",
            Self::Panic(_) => "PanicStmt",
            Self::Expr(_) => "ExprStmt",
            Self::Decl(_) => "Decl",
            Self::Annotation(_) => "Annotation",
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.tag()) }
}

/// A variable specifier: name with optional type (`x: i32`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedVarSpecifier {
    pub name: IdentExpr,
    pub ty: Option<Ty>,
    pub loc: Location,
}

/// Python-style for-loop core (`for x in xs { ... }`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForPyCore {
    pub vars: Vec<NamedVarSpecifier>,
    pub iterable: Expr,
}

/// C-style for-loop core (`for init; cond; update { ... }`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForCCore {
    pub init: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub update: Option<Expr>,
}

/// The two for-loop shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForCore {
    Python(ForPyCore),
    C(ForCCore),
}

/// A for loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForStmt {
    pub core: ForCore,
    pub body: SuiteStmt,
    pub loc: Location,
}

/// A while loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: SuiteStmt,
    pub loc: Location,
}

/// Whether an `if` was written as `if` or `unless`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IfKind {
    If,
    /// Negated condition
    Unless,
}

/// The shape of an else branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElseKind {
    Else,
    ElseIf,
    ElseUnless,
}

/// One `else` / `else if` / `else unless` branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseBranch {
    pub kind: ElseKind,
    pub condition: Option<Expr>,
    pub body: SuiteStmt,
    pub loc: Location,
}

/// An if / unless statement with its chain of else branches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub kind: IfKind,
    pub condition: Expr,
    pub body: SuiteStmt,
    pub else_branches: Vec<ElseBranch>,
    pub loc: Location,
}

/// The kind of a switch case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwitchCaseKind {
    Case,
    Default,
    Fallthrough,
}

/// One case of a switch statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCaseStmt {
    pub kind: SwitchCaseKind,
    pub condition: Option<Expr>,
    pub body: Option<SuiteStmt>,
    pub loc: Location,
}

/// A switch statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchStmt {
    pub condition: Expr,
    pub cases: Vec<SwitchCaseStmt>,
    pub loc: Location,
}

/// A yield statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldStmt {
    pub value: Option<Expr>,
    pub loc: Location,
}

/// A delete statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteStmt {
    pub value: Expr,
    pub loc: Location,
}

/// An alias statement (`alias name = path`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasStmt {
    pub name: IdentExpr,
    pub target: Expr,
    pub loc: Location,
}

/// A single import (`import a::b` / `import a::b as c`).
///
/// Imports are resolved and spliced away by the preprocessor; these nodes
/// only survive inside FFI declarations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleImportStmt {
    pub path: Expr,
    pub alias: Option<IdentExpr>,
    pub loc: Location,
}

/// A multi import (`import a::{b, c}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiImportStmt {
    pub base: Expr,
    pub features: Vec<Expr>,
    pub loc: Location,
}

/// A return statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub loc: Location,
}

/// A break statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakStmt {
    pub loc: Location,
}

/// A continue statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinueStmt {
    pub loc: Location,
}

/// A sequence of statements without its own braces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub loc: Location,
}

/// A suite: a braced block, or a `:`-prefixed single statement body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteStmt {
    pub body: Vec<Stmt>,
    pub loc: Location,
}

impl SuiteStmt {
    /// Creates an empty suite at the given location.
    #[must_use]
    pub const fn empty(loc: Location) -> Self { Self { body: Vec::new(), loc } }
}

/// One catch arm of a try statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchStmt {
    pub binding: Option<NamedVarSpecifier>,
    pub body: SuiteStmt,
    pub loc: Location,
}

/// The finally arm of a try statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinallyStmt {
    pub body: SuiteStmt,
    pub loc: Location,
}

/// A try statement with catch arms and an optional finally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TryStmt {
    pub body: SuiteStmt,
    pub catches: Vec<CatchStmt>,
    pub finally: Option<FinallyStmt>,
    pub loc: Location,
}

/// A panic statement (`panic expr;`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanicStmt {
    pub value: Expr,
    pub loc: Location,
}

/// An expression in statement position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExprStmt {
    pub value: Expr,
    pub loc: Location,
}
