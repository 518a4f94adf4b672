//! Load orchestration: resolve, fetch per provider, validate, coerce.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tagbind_adapters::env::{EnvProvider, EnvSource, ProcessEnv};
use tagbind_adapters::http_store::{HttpParameterStore, HttpParameterStoreConfig};
use tagbind_adapters::parameter_store::{ParameterStore, ParameterStoreProvider};
use tagbind_adapters::traits::{FetchOutcome, Provider};
use tagbind_primitives::{Bind, Error, FieldPath, PathConfig, ProviderKind, Resolver, Result};
use tracing::debug;

use crate::phase::LoadProgress;

/// Binds tagged structures to environment and remote store values.
///
/// A loader holds no per-load state and can be shared across concurrent loads.
#[derive(Clone)]
pub struct Loader {
    prefix: Option<String>,
    env: Arc<dyn EnvSource>,
    store: Option<Arc<dyn ParameterStore>>,
    with_decryption: bool,
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("prefix", &self.prefix)
            .field("store_configured", &self.store.is_some())
            .field("with_decryption", &self.with_decryption)
            .finish_non_exhaustive()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Creates a loader reading the process environment, with no prefix and
    /// the default remote store client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: None,
            env: Arc::new(ProcessEnv),
            store: None,
            with_decryption: true,
        }
    }

    /// Prepends `prefix` to every remote store path.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Uses the supplied client for remote store lookups.
    #[must_use]
    pub fn with_parameter_store<S>(mut self, store: S) -> Self
    where
        S: ParameterStore + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }

    /// Reads environment bindings (and the default store endpoint) from `source`.
    #[must_use]
    pub fn with_env_source<E>(mut self, source: E) -> Self
    where
        E: EnvSource + 'static,
    {
        self.env = Arc::new(source);
        self
    }

    /// Sets whether remote store values are requested decrypted (default `true`).
    #[must_use]
    pub fn with_decryption(mut self, with_decryption: bool) -> Self {
        self.with_decryption = with_decryption;
        self
    }

    /// Returns the configured remote store prefix.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Populates every tagged field of `target`.
    ///
    /// Fields whose value is absent keep their current value unless marked
    /// `required`. On error, fields may be partially written.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTag`] / [`Error::DuplicatePath`] from tag resolution.
    /// - [`Error::ProviderNotConfigured`] when remote store bindings exist but
    ///   no client was supplied or can be built from the environment.
    /// - [`Error::ProviderFetch`] when a provider's batch fails.
    /// - [`Error::MissingRequiredValue`] when a required binding has no value.
    /// - [`Error::Coercion`] when a value does not parse as the field's type.
    pub async fn load<T>(&self, target: &mut T) -> Result<()>
    where
        T: Bind + ?Sized,
    {
        let mut progress = LoadProgress::new();
        let result = self.run(target, &mut progress).await;
        if result.is_ok() {
            progress.advance();
        } else {
            progress.fail();
        }
        result
    }

    async fn run<T>(&self, target: &mut T, progress: &mut LoadProgress) -> Result<()>
    where
        T: Bind + ?Sized,
    {
        let root = FieldPath::store_root(self.prefix.as_deref());
        let mut bindings = Resolver::resolve(target, root)?;
        progress.advance();

        let outcomes = self.fetch_all(partition(&bindings)).await?;
        progress.advance();

        for binding in &bindings {
            if binding.required() && raw_value(&outcomes, binding).is_none() {
                return Err(Error::MissingRequiredValue {
                    path: binding.path().clone(),
                    provider: binding.provider(),
                });
            }
        }
        progress.advance();

        for binding in &mut bindings {
            if let Some(raw) = raw_value(&outcomes, binding) {
                binding.assign(raw)?;
            }
        }
        progress.advance();

        Ok(())
    }

    /// Issues one fetch per provider partition.
    async fn fetch_all(
        &self,
        partitions: Vec<(ProviderKind, Vec<String>)>,
    ) -> Result<HashMap<ProviderKind, FetchOutcome>> {
        let mut outcomes = HashMap::new();
        for (kind, names) in partitions {
            let provider = self.provider(kind)?;
            let served = provider.kind();
            debug!(provider = %served, names = names.len(), "fetching configuration values");
            let outcome = provider
                .fetch(&names)
                .await
                .map_err(|err| Error::provider_fetch(served, err))?;
            outcomes.insert(served, outcome);
        }
        Ok(outcomes)
    }

    fn provider(&self, kind: ProviderKind) -> Result<Box<dyn Provider>> {
        match kind {
            ProviderKind::Environment => Ok(Box::new(EnvProvider::new(Arc::clone(&self.env)))),
            ProviderKind::RemoteStore => {
                let store: Arc<dyn ParameterStore> = match &self.store {
                    Some(store) => Arc::clone(store),
                    None => self.default_store()?,
                };
                Ok(Box::new(
                    ParameterStoreProvider::new(store).with_decryption(self.with_decryption),
                ))
            }
        }
    }

    fn default_store(&self) -> Result<Arc<dyn ParameterStore>> {
        let config = HttpParameterStoreConfig::from_env_source(&self.env).map_err(|err| {
            Error::ProviderNotConfigured {
                provider: ProviderKind::RemoteStore,
                reason: err.to_string(),
            }
        })?;
        Ok(Arc::new(HttpParameterStore::new(config)))
    }
}

/// Groups binding paths by provider, skipping providers without bindings.
fn partition(bindings: &[PathConfig<'_>]) -> Vec<(ProviderKind, Vec<String>)> {
    ProviderKind::ALL
        .into_iter()
        .map(|kind| {
            let names = bindings
                .iter()
                .filter(|binding| binding.provider() == kind)
                .map(|binding| binding.path().to_string())
                .collect::<Vec<_>>();
            (kind, names)
        })
        .filter(|(_, names)| !names.is_empty())
        .collect()
}

fn raw_value<'o>(
    outcomes: &'o HashMap<ProviderKind, FetchOutcome>,
    binding: &PathConfig<'_>,
) -> Option<&'o str> {
    outcomes
        .get(&binding.provider())
        .and_then(|outcome| outcome.value(binding.path().as_str()))
}

/// Populates `target` using a default [`Loader`].
///
/// # Errors
///
/// See [`Loader::load`].
pub async fn load<T>(target: &mut T) -> Result<()>
where
    T: Bind + ?Sized,
{
    Loader::new().load(target).await
}
