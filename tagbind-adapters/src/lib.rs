//! Value providers used by the tagbind loader.
//!
//! Each module exposes one source of configuration values while sharing the
//! batched fetch interface defined in [`traits`].

#![warn(missing_docs, clippy::pedantic)]

pub mod env;
pub mod http_store;
pub mod parameter_store;
pub mod traits;
