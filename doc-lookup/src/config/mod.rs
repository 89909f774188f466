//! Lookup configuration: doc sets, FAQ page and HTTP client knobs.

pub mod default_config;
pub mod doc_set;

pub use doc_set::{AnchorPrefixes, DocSet, DocVariant, validate_http_url};

use crate::errors::DocLookupConfigError;

/// HTTP client settings used by the page fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Transport-level timeout for one page request.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

/// Full configuration of the lookup subsystem.
///
/// Immutable once built; the service keeps it for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Doc sets in declared order.
    pub doc_sets: Vec<DocSet>,
    /// FAQ page indexed by the FAQ cache.
    pub faq_url: String,
    /// Prefix that `##<n>` issue references are appended to.
    pub issues_url: String,
    /// Anchor prefixes stripped from API identifiers.
    pub prefixes: AnchorPrefixes,
    /// HTTP client settings.
    pub http: HttpConfig,
}

impl LookupConfig {
    /// Returns the doc set registered under `key`.
    pub fn doc_set(&self, key: &str) -> Result<&DocSet, DocLookupConfigError> {
        self.doc_sets
            .iter()
            .find(|d| d.key == key)
            .ok_or_else(|| DocLookupConfigError::UnknownDocSet(key.to_string()))
    }

    /// Validates every URL and doc set.
    pub fn validate(&self) -> Result<(), DocLookupConfigError> {
        for set in &self.doc_sets {
            set.validate()?;
        }
        validate_http_url("DOCS_FAQ_URL", &self.faq_url)?;
        validate_http_url("DOCS_ISSUES_URL", &self.issues_url)?;
        if self.http.timeout_secs == 0 {
            return Err(DocLookupConfigError::InvalidNumber {
                var: "DOCS_HTTP_TIMEOUT_SECS",
                reason: "expected a positive number of seconds",
            });
        }
        Ok(())
    }
}
