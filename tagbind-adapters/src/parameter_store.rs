//! Remote parameter store provider and the client capability it wraps.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tagbind_primitives::ProviderKind;
use tracing::debug;

use crate::traits::{FetchOutcome, Provider, ProviderResult};

/// Batched lookup request, shaped like the store's `GetParameters` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetParametersRequest {
    names: Vec<String>,
    with_decryption: bool,
}

impl GetParametersRequest {
    /// Creates a request for the supplied fully-qualified names.
    #[must_use]
    pub fn new(names: Vec<String>, with_decryption: bool) -> Self {
        Self {
            names,
            with_decryption,
        }
    }

    /// Returns the requested names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns whether encrypted values should be returned in plain text.
    #[must_use]
    pub const fn with_decryption(&self) -> bool {
        self.with_decryption
    }
}

/// Single resolved parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Response to a [`GetParametersRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetParametersResponse {
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    invalid_parameters: Vec<String>,
}

impl GetParametersResponse {
    /// Creates a response from resolved parameters and unmatched names.
    #[must_use]
    pub fn new(parameters: Vec<Parameter>, invalid_parameters: Vec<String>) -> Self {
        Self {
            parameters,
            invalid_parameters,
        }
    }

    /// Returns the resolved parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the names the store had no value for.
    #[must_use]
    pub fn invalid_parameters(&self) -> &[String] {
        &self.invalid_parameters
    }

    /// Appends another response's results to this one.
    pub fn merge(&mut self, other: Self) {
        self.parameters.extend(other.parameters);
        self.invalid_parameters.extend(other.invalid_parameters);
    }
}

/// Client capability for a remote parameter store.
///
/// Implementations must not fail solely because some names are unknown; those
/// belong in [`GetParametersResponse::invalid_parameters`].
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Looks up a batch of names in one call.
    async fn get_parameters(
        &self,
        request: GetParametersRequest,
    ) -> ProviderResult<GetParametersResponse>;
}

#[async_trait]
impl<S> ParameterStore for Arc<S>
where
    S: ParameterStore + ?Sized,
{
    async fn get_parameters(
        &self,
        request: GetParametersRequest,
    ) -> ProviderResult<GetParametersResponse> {
        (**self).get_parameters(request).await
    }
}

/// Provider translating [`ParameterStore`] responses into [`FetchOutcome`]s.
#[derive(Clone, Debug)]
pub struct ParameterStoreProvider<S> {
    store: S,
    with_decryption: bool,
}

impl<S: ParameterStore> ParameterStoreProvider<S> {
    /// Wraps a store client; values are requested decrypted.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            with_decryption: true,
        }
    }

    /// Sets whether encrypted values are requested decrypted.
    #[must_use]
    pub fn with_decryption(mut self, with_decryption: bool) -> Self {
        self.with_decryption = with_decryption;
        self
    }
}

#[async_trait]
impl<S: ParameterStore> Provider for ParameterStoreProvider<S> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RemoteStore
    }

    async fn fetch(&self, names: &[String]) -> ProviderResult<FetchOutcome> {
        let mut outcome = FetchOutcome::new();
        if names.is_empty() {
            return Ok(outcome);
        }

        let request = GetParametersRequest::new(names.to_vec(), self.with_decryption);
        let response = self.store.get_parameters(request).await?;

        let requested: HashSet<&str> = names.iter().map(String::as_str).collect();
        for parameter in response.parameters {
            if requested.contains(parameter.name.as_str()) {
                outcome.insert(parameter.name, parameter.value);
            }
        }
        for name in names {
            if outcome.value(name).is_none() {
                outcome.mark_missing(name.as_str());
            }
        }

        debug!(
            requested = names.len(),
            invalid = response.invalid_parameters.len(),
            missing = outcome.missing().len(),
            "parameter store lookup complete"
        );
        Ok(outcome)
    }
}

/// In-memory [`ParameterStore`], for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    params: HashMap<String, String>,
    requests: AtomicUsize,
}

impl MemoryParameterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter under its fully-qualified name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns how many `get_parameters` calls have been served.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryParameterStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameters(
        &self,
        request: GetParametersRequest,
    ) -> ProviderResult<GetParametersResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let mut response = GetParametersResponse::default();
        for name in request.names {
            match self.params.get(&name) {
                Some(value) => response.parameters.push(Parameter::new(name, value.as_str())),
                None => response.invalid_parameters.push(name),
            }
        }
        Ok(response)
    }
}
