//! Declaration node types.

use std::fmt;

use hlx_source::Location;
use serde::Serialize;

use super::expressions::{Expr, IdentExpr, LiteralExpr, ScopePathExpr};
use super::statements::{NamedVarSpecifier, Stmt, SuiteStmt};
use super::types::Ty;
use crate::modifiers::{AccessSpecifier, Modifiers};

/// The closed set of declaration variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Decl {
    Func(FuncDecl),
    Var(VarDecl),
    Let(LetDecl),
    Const(ConstDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    EnumMember(EnumMemberDecl),
    TypeAlias(TypeAliasDecl),
    Ffi(FfiDecl),
    Op(OpDecl),
    Module(ModuleDecl),
    Requires(RequiresDecl),
    RequiresParam(RequiresParamDecl),
    RequiresParamList(RequiresParamListDecl),
    TypeBound(TypeBoundDecl),
    TypeBoundList(TypeBoundListDecl),
    UdtDerive(UdtDeriveDecl),
}

impl Decl {
    /// Returns the token range this declaration covers.
    #[must_use]
    pub fn loc(&self) -> &Location {
        match self {
            Self::Func(node) => &node.loc,
            Self::Var(node) => &node.loc,
            Self::Let(node) => &node.loc,
            Self::Const(node) => &node.loc,
            Self::Class(node) => &node.loc,
            Self::Interface(node) => &node.loc,
            Self::Struct(node) => &node.loc,
            Self::Enum(node) => &node.loc,
            Self::EnumMember(node) => &node.loc,
            Self::TypeAlias(node) => &node.loc,
            Self::Ffi(node) => &node.loc,
            Self::Op(node) => &node.loc,
            Self::Module(node) => &node.loc,
            Self::Requires(node) => &node.loc,
            Self::RequiresParam(node) => &node.loc,
            Self::RequiresParamList(node) => &node.loc,
            Self::TypeBound(node) => &node.loc,
            Self::TypeBoundList(node) => &node.loc,
            Self::UdtDerive(node) => &node.loc,
        }
    }

    /// Returns the variant tag as a name, for debug output and the
    /// "invalid modifier for declaration" diagnostic.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Func(_) => "FuncDecl",
            Self::Var(_) => "VarDecl",
            Self::Let(_) => "LetDecl",
            Self::Const(_) => "ConstDecl",
            Self::Class(_) => "ClassDecl",
            Self::Interface(_) => "InterfaceDecl",
            Self::Struct(_) => "StructDecl",
            Self::Enum(_) => "EnumDecl",
            Self::EnumMember(_) => "EnumMemberDecl",
            Self::TypeAlias(_) => "TypeAliasDecl",
            Self::Ffi(_) => "FfiDecl",
            Self::Op(_) => "OpDecl",
            Self::Module(_) => "ModuleDecl",
            Self::Requires(_) => "RequiresDecl",
            Self::RequiresParam(_) => "RequiresParamDecl",
            Self::RequiresParamList(_) => "RequiresParamListDecl",
            Self::TypeBound(_) => "TypeBoundDecl",
            Self::TypeBoundList(_) => "TypeBoundListDecl",
            Self::UdtDerive(_) => "UdtDeriveDecl",
        }
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.tag()) }
}

/// A function declaration.
///
/// Inside a class body, a function whose first parameter is a bare `self`
/// is a method; the emitter strips the receiver and places an access
/// section marker before the function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDecl {
    pub name: IdentExpr,
    pub generics: Option<RequiresDecl>,
    pub params: Vec<VarDecl>,
    pub returns: Option<Ty>,
    pub body: Option<SuiteStmt>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

impl FuncDecl {
    /// Returns true if the first parameter is a bare `self` receiver.
    #[must_use]
    pub fn takes_self(&self) -> bool {
        self.params.first().is_some_and(|param| {
            param.var.name.name == "self" && param.var.ty.is_none() && param.value.is_none()
        })
    }
}

/// A single variable: specifier plus optional initializer.
///
/// Also used for function parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub var: NamedVarSpecifier,
    pub value: Option<Expr>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// A `let` binding of one or more variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetDecl {
    pub vars: Vec<VarDecl>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// A `const` binding of one or more variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstDecl {
    pub vars: Vec<VarDecl>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: IdentExpr,
    pub generics: Option<RequiresDecl>,
    pub derives: Option<UdtDeriveDecl>,
    pub body: Option<SuiteStmt>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// An interface declaration; lowered to a template concept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDecl {
    pub name: IdentExpr,
    pub generics: Option<RequiresDecl>,
    pub derives: Option<UdtDeriveDecl>,
    pub body: Option<SuiteStmt>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// A struct declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructDecl {
    pub name: IdentExpr,
    pub generics: Option<RequiresDecl>,
    pub derives: Option<UdtDeriveDecl>,
    pub body: Option<SuiteStmt>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// An enum declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: IdentExpr,
    pub derives: Option<Ty>,
    pub members: Vec<EnumMemberDecl>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// One member of an enum, with an optional explicit value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMemberDecl {
    pub name: IdentExpr,
    pub value: Option<Expr>,
    pub loc: Location,
}

/// A type alias (`type Name = T;`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAliasDecl {
    pub name: IdentExpr,
    pub generics: Option<RequiresDecl>,
    pub value: Ty,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// An FFI declaration: ABI string plus the import it wraps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FfiDecl {
    pub abi: LiteralExpr,
    pub value: Box<Stmt>,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// An operator overload: the operator tokens plus the backing function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpDecl {
    pub op: Vec<String>,
    pub func: FuncDecl,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// A module declaration (`module a::b { ... }`).
///
/// An anonymous module has no name and does not contribute to qualified
/// names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDecl {
    pub name: Option<ScopePathExpr>,
    pub body: SuiteStmt,
    pub inline_module: bool,
    pub modifiers: Modifiers,
    pub loc: Location,
}

/// A generics clause: `requires <params> [if bounds]`; lowered to a
/// template parameter list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiresDecl {
    pub params: RequiresParamListDecl,
    pub bounds: Option<TypeBoundListDecl>,
    pub loc: Location,
}

/// One generic parameter, possibly const (`requires <const N: usize>`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiresParamDecl {
    pub is_const: bool,
    pub var: NamedVarSpecifier,
    pub value: Option<Expr>,
    pub loc: Location,
}

/// The parenthesized list of generic parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiresParamListDecl {
    pub params: Vec<RequiresParamDecl>,
    pub loc: Location,
}

/// One bound constraining a generic parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBoundDecl {
    pub bound: Expr,
    pub loc: Location,
}

/// The conjunction of bounds of a requires clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBoundListDecl {
    pub bounds: Vec<TypeBoundDecl>,
    pub loc: Location,
}

/// The derive list of a user-defined type, with per-derive access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UdtDeriveDecl {
    pub derives: Vec<(Ty, AccessSpecifier)>,
    pub loc: Location,
}
