use crate::errors::DocLookupConfigError;

/// Which flavour of the documentation a [`DocSet`] serves.
///
/// Only the current variant gets alias normalization; legacy queries are
/// matched as typed (apart from space handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocVariant {
    /// Actively developed API (aliases and capability names resolved).
    Current,
    /// Older API kept for reference.
    Legacy,
}

/// A named documentation variant backed by one or more HTML pages.
///
/// Pages are fetched in declared order; when two pages define the same
/// identifier the later page wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSet {
    /// Lookup key (e.g. `"latest"`, `"rewrite"`).
    pub key: String,
    /// Landing page returned for empty queries.
    pub landing_url: String,
    /// API pages, in the order their anchors are merged.
    pub pages: Vec<String>,
    /// Variant controlling query normalization.
    pub variant: DocVariant,
}

impl DocSet {
    pub fn new(
        key: impl Into<String>,
        landing_url: impl Into<String>,
        pages: Vec<String>,
        variant: DocVariant,
    ) -> Self {
        Self {
            key: key.into(),
            landing_url: landing_url.into(),
            pages,
            variant,
        }
    }

    /// Checks that the set has pages and that every URL is absolute http(s).
    pub fn validate(&self) -> Result<(), DocLookupConfigError> {
        if self.pages.is_empty() {
            return Err(DocLookupConfigError::EmptyDocSet(self.key.clone()));
        }
        validate_http_url("landing_url", &self.landing_url)?;
        for page in &self.pages {
            validate_http_url("pages", page)?;
        }
        Ok(())
    }
}

/// Anchor prefixes that only exist for HTML anchoring and are dropped
/// from identifiers (`#discord.ext.commands.Bot` → `Bot`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPrefixes {
    /// Documentation namespace prefix, including the leading `#`.
    pub namespace: String,
    /// Sub-namespace prefix removed after the namespace one.
    pub sub_namespace: String,
}

impl Default for AnchorPrefixes {
    fn default() -> Self {
        Self {
            namespace: "#discord.".to_string(),
            sub_namespace: "ext.commands.".to_string(),
        }
    }
}

/// Validates that a URL starts with `http://` or `https://`.
pub fn validate_http_url(var: &'static str, value: &str) -> Result<(), DocLookupConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(DocLookupConfigError::InvalidFormat {
            var,
            value: value.to_string(),
        })
    }
}
