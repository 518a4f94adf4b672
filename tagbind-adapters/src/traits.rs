//! Shared provider trait and data structures.

use std::collections::HashMap;

use async_trait::async_trait;
use tagbind_primitives::ProviderKind;
use thiserror::Error;

/// Result alias used by providers.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Error type shared by provider implementations.
///
/// Names without a value are never reported through this type; see
/// [`FetchOutcome::missing`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider is misconfigured or missing its endpoint.
    #[error("provider not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// Transport-level failures (network, protocol, timeouts).
    #[error("provider transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The backing service returned a malformed or failed response.
    #[error("provider response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl ProviderError {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Values resolved by one batched fetch, plus the names that had none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    values: HashMap<String, String>,
    missing: Vec<String>,
}

impl FetchOutcome {
    /// Creates an empty outcome.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resolved value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Records a name that had no value.
    pub fn mark_missing(&mut self, name: impl Into<String>) {
        self.missing.push(name.into());
    }

    /// Returns the raw value for `name`, if one was resolved.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns `true` when `name` was reported without a value.
    #[must_use]
    pub fn is_missing(&self, name: &str) -> bool {
        self.missing.iter().any(|missing| missing == name)
    }

    /// Returns every resolved name/value pair.
    #[must_use]
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Returns the names that had no value, in request order.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

/// Trait implemented by every configuration source.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns which provider kind this source serves.
    fn kind(&self) -> ProviderKind;

    /// Looks up a batch of fully-qualified names.
    ///
    /// Missing names are data, reported through [`FetchOutcome::missing`];
    /// an error means the batch as a whole could not be served.
    async fn fetch(&self, names: &[String]) -> ProviderResult<FetchOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_tracks_values_and_misses() {
        let mut outcome = FetchOutcome::new();
        outcome.insert("/myapp/debug", "true");
        outcome.mark_missing("/myapp/api_key");

        assert_eq!(outcome.value("/myapp/debug"), Some("true"));
        assert_eq!(outcome.value("/myapp/api_key"), None);
        assert!(outcome.is_missing("/myapp/api_key"));
        assert!(!outcome.is_missing("/myapp/debug"));
        assert_eq!(outcome.values().len(), 1);
    }

    #[test]
    fn errors_render_reason() {
        let err = ProviderError::transport("connection reset");
        assert_eq!(err.to_string(), "provider transport error: connection reset");
        assert!(matches!(
            ProviderError::configuration("no endpoint"),
            ProviderError::Configuration { .. }
        ));
    }
}
