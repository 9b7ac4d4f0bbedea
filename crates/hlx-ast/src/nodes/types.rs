//! Type node types.

use std::fmt;

use hlx_source::Location;
use serde::Serialize;

use super::expressions::{Expr, GenericInvokeExpr};

/// The closed set of type variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Ty {
    Path(PathTy),
    Tuple(TupleTy),
    Array(ArrayTy),
}

impl Ty {
    /// Returns the token range this type covers.
    #[must_use]
    pub fn loc(&self) -> &Location {
        match self {
            Self::Path(node) => &node.loc,
            Self::Tuple(node) => &node.loc,
            Self::Array(node) => &node.loc,
        }
    }

    /// Returns the variant tag as a name, for debug output.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Path(_) => "PathTy",
            Self::Tuple(_) => "TupleTy",
            Self::Array(_) => "ArrayTy",
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.tag()) }
}

/// A named type: a path expression with an optional generic invocation and
/// leading specifiers (`const T`, `yield T`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathTy {
    pub value: Box<Expr>,
    pub generics: Option<GenericInvokeExpr>,
    pub is_const: bool,
    pub loc: Location,
}

/// A tuple type (`(A, B, C)`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleTy {
    pub elems: Vec<Ty>,
    pub loc: Location,
}

/// An array type (`[T]` or `[T; N]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayTy {
    pub elem: Box<Ty>,
    pub size: Option<Box<Expr>>,
    pub loc: Location,
}
