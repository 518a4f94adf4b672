//! Core shared types and traits for tag-driven configuration binding.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod path;
mod resolver;
mod tag;
mod value;

/// Error type and result alias shared across the workspace.
pub use error::{BoxError, Error, Result};
/// Provider identifiers and resolved source paths.
pub use path::{FieldPath, ProviderKind};
/// Field walking and the flat binding list it produces.
pub use resolver::{Bind, FieldRef, PathConfig, Resolver};
/// Field annotations and their grammar.
pub use tag::{Tag, Tags};
/// Typed setters used during coercion.
pub use value::{FieldValue, parse_bool};
