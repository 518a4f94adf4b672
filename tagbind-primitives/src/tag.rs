//! Field annotation grammar.
//!
//! A tag value is a path segment optionally followed by comma-separated
//! modifiers, e.g. `"/api_key,required"` or `"API_KEY"`.

use crate::{Error, ProviderKind, Result};

const REQUIRED_MODIFIER: &str = "required";

/// Parsed tag value for a single provider key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag<'t> {
    segment: &'t str,
    required: bool,
}

impl<'t> Tag<'t> {
    /// Parses a raw tag value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTag`] when the segment is empty or a modifier is
    /// unknown or repeated.
    pub fn parse(field: &'static str, key: &'static str, raw: &'t str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidTag {
            field,
            key,
            tag: raw.to_owned(),
            reason,
        };

        let mut tokens = raw.split(',').map(str::trim);
        let segment = tokens.next().unwrap_or_default();
        if segment.is_empty() || segment.chars().all(|c| c == '/') {
            return Err(invalid("path segment cannot be empty".into()));
        }

        let mut required = false;
        for modifier in tokens {
            match modifier {
                REQUIRED_MODIFIER if required => {
                    return Err(invalid("`required` given more than once".into()));
                }
                REQUIRED_MODIFIER => required = true,
                other => return Err(invalid(format!("unknown modifier `{other}`"))),
            }
        }

        Ok(Self { segment, required })
    }

    /// Returns the path segment.
    #[must_use]
    pub const fn segment(&self) -> &'t str {
        self.segment
    }

    /// Returns whether the value must be present.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }
}

/// Raw annotations attached to one field, at most one per provider key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tags {
    env: Option<&'static str>,
    ssm: Option<&'static str>,
}

impl Tags {
    /// Creates an empty annotation set; a field carrying it is skipped.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            env: None,
            ssm: None,
        }
    }

    /// Sets the environment variable tag.
    #[must_use]
    pub const fn env(mut self, raw: &'static str) -> Self {
        self.env = Some(raw);
        self
    }

    /// Sets the remote store tag.
    #[must_use]
    pub const fn ssm(mut self, raw: &'static str) -> Self {
        self.ssm = Some(raw);
        self
    }

    /// Returns the raw tag for the given provider.
    #[must_use]
    pub const fn get(&self, provider: ProviderKind) -> Option<&'static str> {
        match provider {
            ProviderKind::Environment => self.env,
            ProviderKind::RemoteStore => self.ssm,
        }
    }

    /// Returns `true` when no provider key is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.env.is_none() && self.ssm.is_none()
    }

    /// Selects the provider a leaf binds to, following [`ProviderKind::PRIORITY`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTag`] when the winning tag is malformed.
    pub fn select(&self, field: &'static str) -> Result<Option<(ProviderKind, Tag<'static>)>> {
        ProviderKind::PRIORITY
            .into_iter()
            .find_map(|provider| self.get(provider).map(|raw| (provider, raw)))
            .map(|(provider, raw)| {
                Tag::parse(field, provider.tag_key(), raw).map(|tag| (provider, tag))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_segment() {
        let tag = Tag::parse("database_url", "ssm", "/database_url").unwrap();
        assert_eq!(tag.segment(), "/database_url");
        assert!(!tag.required());
    }

    #[test]
    fn parses_required_modifier() {
        let tag = Tag::parse("api_key", "env", "API_KEY, required").unwrap();
        assert_eq!(tag.segment(), "API_KEY");
        assert!(tag.required());
    }

    #[test]
    fn rejects_malformed_tags() {
        for raw in ["", ",required", "/", "KEY,optional", "KEY,required,required"] {
            let err = Tag::parse("field", "env", raw).expect_err(raw);
            assert!(matches!(err, Error::InvalidTag { .. }), "{raw}: {err}");
        }
    }

    #[test]
    fn remote_store_wins_tie_break() {
        let tags = Tags::new().env("DEBUG").ssm("/debug,required");
        let (provider, tag) = tags.select("debug").unwrap().expect("selected");
        assert_eq!(provider, ProviderKind::RemoteStore);
        assert_eq!(tag.segment(), "/debug");
        assert!(tag.required());
    }

    #[test]
    fn untagged_selects_nothing() {
        assert!(Tags::new().is_empty());
        assert!(Tags::new().select("ignored").unwrap().is_none());
    }
}
