//! Abstract Syntax Tree for the HLX language.
//!
//! Nodes fall into five closed categories — expressions, statements,
//! declarations, types and annotations — each a tagged union over its
//! variants. Parent/child edges are ownership edges: a parent owns its
//! children through `Box`/`Vec` and destroys them with itself; no cycles
//! exist.
//!
//! Every node carries the [`hlx_source::Location`] span of the tokens it was
//! parsed from, sufficient to reconstruct precise diagnostics. Traversal is
//! provided by the [`visitor`] module, whose dispatch is a match over the
//! variant tags.

pub mod modifiers;
pub mod nodes;
pub mod visitor;

pub use modifiers::{AccessSpecifier, Modifier, ModifierCategory, ModifierKind, Modifiers};
pub use nodes::{Annotation, Decl, Expr, Program, Stmt, Ty};
pub use visitor::Visitor;
