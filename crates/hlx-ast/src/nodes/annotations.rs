//! Annotation node types.

use std::fmt;

use hlx_source::Location;
use serde::Serialize;

/// The closed set of annotation variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Annotation {
    /// A `#[...]` compiler directive, kept as its raw span.
    Directive(DirectiveAnnotation),
}

impl Annotation {
    /// Returns the token range this annotation covers.
    #[must_use]
    pub fn loc(&self) -> &Location {
        match self {
            Self::Directive(node) => &node.loc,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directive(_) => write!(f, "DirectiveAnnotation"),
        }
    }
}

/// A compiler directive (`#[...]`), uninterpreted by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveAnnotation {
    pub text: String,
    pub loc: Location,
}
