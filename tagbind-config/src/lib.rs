//! Loading of tagged configuration structures.
//!
//! [`Loader`] resolves a structure's field tags, fetches every binding from its
//! provider in one batch per provider, checks required values and writes the
//! coerced results back into the structure.

#![warn(missing_docs, clippy::pedantic)]

mod loader;
mod phase;

pub use loader::{Loader, load};
pub use phase::{LoadPhase, LoadProgress};
