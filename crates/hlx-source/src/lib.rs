//! Source file handling and location tracking for the HLX compiler.
//!
//! This crate provides the fundamental types for working with source code in
//! the HLX compilation pipeline: reading and caching file contents, and
//! describing precise locations inside those files.
//!
//! The crate consists of two modules:
//! - [`cache`]: the read-once source cache with by-line access
//! - [`location`]: the location metadata attached to every token
//!
//! Together they form the foundation for diagnostics: every error rendered by
//! the compiler resolves its context lines through the cache using the
//! locations recorded here.

pub mod cache;
pub mod location;

pub use cache::SourceCache;
pub use location::Location;
