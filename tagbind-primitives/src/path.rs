//! Provider identifiers and source path construction.

use std::fmt::{self, Display, Formatter};

/// Separator used between remote store path segments.
const STORE_SEPARATOR: char = '/';

/// Separator used between nested environment variable segments.
const ENV_SEPARATOR: char = '_';

/// Named source of configuration values.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum ProviderKind {
    /// Process environment variables.
    Environment,
    /// Hierarchical remote parameter store.
    RemoteStore,
}

impl ProviderKind {
    /// Every provider, in the order partitions are fetched.
    pub const ALL: [Self; 2] = [Self::Environment, Self::RemoteStore];

    /// Tie-break order when a leaf carries tags for more than one provider.
    pub const PRIORITY: [Self; 2] = [Self::RemoteStore, Self::Environment];

    /// Returns the annotation key selecting this provider.
    #[must_use]
    pub const fn tag_key(self) -> &'static str {
        match self {
            Self::Environment => "env",
            Self::RemoteStore => "ssm",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Environment => "environment",
            Self::RemoteStore => "remote store",
        })
    }
}

/// Fully-qualified name a binding is looked up under.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    /// Builds the remote store root from an optional prefix.
    ///
    /// The root always starts with `/` and never ends with one, except for the
    /// bare root `/` itself.
    #[must_use]
    pub fn store_root(prefix: Option<&str>) -> Self {
        let trimmed = prefix.unwrap_or_default().trim_matches(STORE_SEPARATOR);
        if trimmed.is_empty() {
            Self(STORE_SEPARATOR.to_string())
        } else {
            Self(format!("{STORE_SEPARATOR}{trimmed}"))
        }
    }

    /// Appends a remote store segment, collapsing separators at the seam.
    #[must_use]
    pub fn join_store(&self, segment: &str) -> Self {
        let base = self.0.trim_end_matches(STORE_SEPARATOR);
        let segment = segment.trim_matches(STORE_SEPARATOR);
        Self(format!("{base}{STORE_SEPARATOR}{segment}"))
    }

    /// Appends an environment variable segment to an optional parent name.
    #[must_use]
    pub fn join_env(base: Option<&Self>, segment: &str) -> Self {
        match base {
            Some(parent) => Self(format!("{}{ENV_SEPARATOR}{segment}", parent.0)),
            None => Self(segment.to_owned()),
        }
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the path, returning the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for FieldPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_root_normalises_prefix() {
        assert_eq!(FieldPath::store_root(None), "/");
        assert_eq!(FieldPath::store_root(Some("")), "/");
        assert_eq!(FieldPath::store_root(Some("/myapp")), "/myapp");
        assert_eq!(FieldPath::store_root(Some("myapp/")), "/myapp");
        assert_eq!(FieldPath::store_root(Some("/team/myapp/")), "/team/myapp");
    }

    #[test]
    fn store_join_collapses_separators() {
        let root = FieldPath::store_root(None);
        assert_eq!(root.join_store("/database_url"), "/database_url");
        assert_eq!(root.join_store("debug"), "/debug");

        let prefixed = FieldPath::store_root(Some("/myapp"));
        let nested = prefixed.join_store("/nested/");
        assert_eq!(nested, "/myapp/nested");
        assert_eq!(nested.join_store("/sub_field"), "/myapp/nested/sub_field");
    }

    #[test]
    fn env_join_uses_underscores() {
        let root = FieldPath::join_env(None, "DB");
        assert_eq!(root, "DB");
        assert_eq!(FieldPath::join_env(Some(&root), "HOST"), "DB_HOST");
    }

    #[test]
    fn priority_prefers_remote_store() {
        assert_eq!(ProviderKind::PRIORITY[0], ProviderKind::RemoteStore);
        assert_eq!(ProviderKind::RemoteStore.tag_key(), "ssm");
        assert_eq!(ProviderKind::Environment.tag_key(), "env");
    }
}
