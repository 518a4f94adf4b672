//! Bind tagged configuration structures to their value sources.
//!
//! Annotate fields with `#[bind(env = "...")]` or `#[bind(ssm = "...")]`, derive
//! [`Bind`], and call [`load`] or [`Loader::load`]:
//!
//! ```ignore
//! use tagbind::{Bind, Loader};
//!
//! #[derive(Bind, Default)]
//! struct Config {
//!     #[bind(ssm = "/database_url")]
//!     database_url: String,
//!     #[bind(env = "API_KEY,required")]
//!     api_key: String,
//!     #[bind(ssm = "/debug")]
//!     debug: bool,
//! }
//!
//! let mut config = Config::default();
//! Loader::new().with_prefix("/myapp").load(&mut config).await?;
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Tag grammar, resolver, coercions and the shared error type.
pub use tagbind_primitives::{
    Bind, BoxError, Error, FieldPath, FieldRef, FieldValue, PathConfig, ProviderKind, Resolver,
    Result, Tag, Tags, parse_bool,
};

/// `#[derive(Bind)]` (enabled by the `derive` feature).
#[cfg(feature = "derive")]
pub use tagbind_macros::Bind;

/// Load orchestration.
pub use tagbind_config::{LoadPhase, LoadProgress, Loader, load};

/// Environment and parameter store providers.
pub use tagbind_adapters as adapters;
