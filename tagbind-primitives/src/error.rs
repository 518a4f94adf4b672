//! Shared error definitions for configuration binding.

use thiserror::Error;

use crate::{FieldPath, ProviderKind};

/// Result alias used throughout tagbind.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error carried by provider failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving, fetching, or coercing configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// A field annotation could not be parsed or is not allowed where it appears.
    #[error("invalid `{key}` tag `{tag}` on field `{field}`: {reason}")]
    InvalidTag {
        /// Name of the annotated field.
        field: &'static str,
        /// Tag key (`env` or `ssm`).
        key: &'static str,
        /// Raw tag value.
        tag: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Two fields resolved to the same path for the same provider.
    #[error("duplicate {provider} path `{path}` (fields `{first}` and `{second}`)")]
    DuplicatePath {
        /// The colliding path.
        path: FieldPath,
        /// Provider both bindings target.
        provider: ProviderKind,
        /// Field that claimed the path first.
        first: &'static str,
        /// Field that collided with it.
        second: &'static str,
    },

    /// A required value was absent from its provider's result.
    #[error("missing required value for `{path}` from {provider}")]
    MissingRequiredValue {
        /// Path that had no value.
        path: FieldPath,
        /// Provider that was queried.
        provider: ProviderKind,
    },

    /// A raw value could not be converted into the destination field's type.
    #[error("cannot coerce `{raw}` at `{path}` into {target}: {reason}")]
    Coercion {
        /// Path the value was fetched from.
        path: FieldPath,
        /// Raw value returned by the provider.
        raw: String,
        /// Declared type of the destination field.
        target: &'static str,
        /// Parser failure description.
        reason: String,
    },

    /// The provider's batched fetch failed as a whole.
    #[error("{provider} fetch failed: {source}")]
    ProviderFetch {
        /// Provider whose fetch failed.
        provider: ProviderKind,
        /// Underlying adapter error.
        #[source]
        source: BoxError,
    },

    /// Bindings exist for a provider that has no client configured.
    #[error("no client configured for {provider}: {reason}")]
    ProviderNotConfigured {
        /// Provider lacking a client.
        provider: ProviderKind,
        /// Why the default client could not be built.
        reason: String,
    },
}

impl Error {
    /// Wraps an adapter failure for the given provider.
    #[must_use]
    pub fn provider_fetch(provider: ProviderKind, source: impl Into<BoxError>) -> Self {
        Self::ProviderFetch {
            provider,
            source: source.into(),
        }
    }

    /// Returns the path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::DuplicatePath { path, .. }
            | Self::MissingRequiredValue { path, .. }
            | Self::Coercion { path, .. } => Some(path),
            Self::InvalidTag { .. }
            | Self::ProviderFetch { .. }
            | Self::ProviderNotConfigured { .. } => None,
        }
    }
}
