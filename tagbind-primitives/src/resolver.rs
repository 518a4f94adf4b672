//! Structure walking and the flat binding list it produces.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::{Error, FieldPath, FieldValue, ProviderKind, Result, Tag, Tags};

/// Implemented by configuration structures, usually via `#[derive(Bind)]`.
///
/// Implementations visit their tagged fields in declaration order, handing each
/// one to the [`Resolver`] as either a leaf or a nested structure.
pub trait Bind {
    /// Registers this structure's fields with the resolver.
    ///
    /// # Errors
    ///
    /// Propagates tag and path errors raised by the resolver.
    fn bind<'a>(&'a mut self, resolver: &mut Resolver<'a>) -> Result<()>;
}

/// Exclusive handle to a leaf field's storage.
pub struct FieldRef<'a>(&'a mut dyn FieldValue);

impl FieldRef<'_> {
    /// Returns the destination's declared type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldRef").field(&self.type_name()).finish()
    }
}

/// Resolved binding of one leaf field to a provider path.
#[derive(Debug)]
pub struct PathConfig<'a> {
    path: FieldPath,
    required: bool,
    provider: ProviderKind,
    field: &'static str,
    destination: FieldRef<'a>,
}

impl PathConfig<'_> {
    /// Returns the fully-qualified lookup path.
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns whether a value must be present.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }

    /// Returns the provider owning this path.
    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Returns the name of the bound field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Returns the destination's declared type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.destination.type_name()
    }

    /// Coerces `raw` into the destination field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Coercion`] naming the path, raw value and target type.
    pub fn assign(&mut self, raw: &str) -> Result<()> {
        self.destination
            .0
            .assign(raw)
            .map_err(|reason| Error::Coercion {
                path: self.path.clone(),
                raw: raw.to_owned(),
                target: self.destination.type_name(),
                reason,
            })
    }
}

/// Depth-first walker turning a [`Bind`] structure into [`PathConfig`] entries.
#[derive(Debug)]
pub struct Resolver<'a> {
    store_base: FieldPath,
    env_base: Option<FieldPath>,
    entries: Vec<PathConfig<'a>>,
    claimed: HashMap<(ProviderKind, FieldPath), &'static str>,
}

impl<'a> Resolver<'a> {
    /// Resolves every tagged leaf of `target`, rooting remote store paths at `store_root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTag`] for malformed annotations and
    /// [`Error::DuplicatePath`] when two leaves claim the same path.
    pub fn resolve<T>(target: &'a mut T, store_root: FieldPath) -> Result<Vec<PathConfig<'a>>>
    where
        T: Bind + ?Sized,
    {
        let mut resolver = Self {
            store_base: store_root,
            env_base: None,
            entries: Vec::new(),
            claimed: HashMap::new(),
        };
        target.bind(&mut resolver)?;
        debug!(bindings = resolver.entries.len(), "resolved configuration tags");
        Ok(resolver.entries)
    }

    /// Registers a leaf field. Fields without tags are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTag`] or [`Error::DuplicatePath`].
    pub fn leaf<V>(&mut self, field: &'static str, tags: Tags, value: &'a mut V) -> Result<()>
    where
        V: FieldValue,
    {
        let Some((provider, tag)) = tags.select(field)? else {
            return Ok(());
        };

        let path = match provider {
            ProviderKind::RemoteStore => self.store_base.join_store(tag.segment()),
            ProviderKind::Environment => FieldPath::join_env(self.env_base.as_ref(), tag.segment()),
        };

        if let Some(first) = self.claimed.insert((provider, path.clone()), field) {
            return Err(Error::DuplicatePath {
                path,
                provider,
                first,
                second: field,
            });
        }

        self.entries.push(PathConfig {
            path,
            required: tag.required(),
            provider,
            field,
            destination: FieldRef(value),
        });
        Ok(())
    }

    /// Descends into a nested structure. The field itself never becomes a binding.
    ///
    /// Each provider tag on the field extends that provider's base path for the
    /// duration of the descent; an untagged nested field is skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTag`] when a grouping tag is malformed or marked
    /// `required`, and propagates errors from the nested fields.
    pub fn nested<T>(&mut self, field: &'static str, tags: Tags, value: &'a mut T) -> Result<()>
    where
        T: Bind + ?Sized,
    {
        if tags.is_empty() {
            return Ok(());
        }

        let mut store_base = self.store_base.clone();
        let mut env_base = self.env_base.clone();
        for provider in ProviderKind::ALL {
            let Some(raw) = tags.get(provider) else {
                continue;
            };
            let tag = Tag::parse(field, provider.tag_key(), raw)?;
            if tag.required() {
                return Err(Error::InvalidTag {
                    field,
                    key: provider.tag_key(),
                    tag: raw.to_owned(),
                    reason: "`required` only applies to leaf fields".into(),
                });
            }
            match provider {
                ProviderKind::RemoteStore => store_base = store_base.join_store(tag.segment()),
                ProviderKind::Environment => {
                    env_base = Some(FieldPath::join_env(env_base.as_ref(), tag.segment()));
                }
            }
        }

        let saved_store = std::mem::replace(&mut self.store_base, store_base);
        let saved_env = std::mem::replace(&mut self.env_base, env_base);
        let result = value.bind(self);
        self.store_base = saved_store;
        self.env_base = saved_env;
        result
    }
}
