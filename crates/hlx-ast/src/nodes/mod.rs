//! AST node type definitions.
//!
//! Nodes are organized by category; each category module defines a closed
//! enum plus one struct per variant.

mod annotations;
mod declarations;
mod expressions;
mod statements;
mod types;

use std::fmt;

pub use annotations::*;
pub use declarations::*;
pub use expressions::*;
use hlx_source::Location;
use serde::Serialize;
pub use statements::*;
pub use types::*;

/// The root of a parsed compilation unit.
///
/// The program owns every node beneath it; children are statements, which
/// at the top level are mostly declaration bridges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Path of the file this program was parsed from
    pub file: String,
    /// Top-level statements and declarations, in source order
    pub children: Vec<Stmt>,
    /// Span from the first to the last token
    pub loc: Location,
}

impl Program {
    /// Creates an empty program for a file.
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        let file = file.into();
        let loc = Location::start_of_file(file.clone());

        Self { file, children: Vec::new(), loc }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Program({}, {} children)", self.file, self.children.len())
    }
}
