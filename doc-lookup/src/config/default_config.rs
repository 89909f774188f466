//! Default lookup config with environment overrides.
//!
//! # Environment variables
//!
//! All optional:
//! - `DOCS_BASE_URL`          = root of the versioned docs (default `https://discordpy.readthedocs.org/en`)
//! - `DOCS_FAQ_URL`           = FAQ page (default `http://discordpy.readthedocs.io/en/latest/faq.html`)
//! - `DOCS_ISSUES_URL`        = issue link prefix (default `https://github.com/Rapptz/discord.py/issues/`)
//! - `DOCS_HTTP_TIMEOUT_SECS` = per-request timeout (u64, default 15)
//! - `DOCS_USER_AGENT`        = `User-Agent` header (default `rtfm-backend/0.1`)

use crate::{
    config::{AnchorPrefixes, DocSet, DocVariant, HttpConfig, LookupConfig},
    errors::DocLookupConfigError,
};

pub const DEFAULT_BASE_URL: &str = "https://discordpy.readthedocs.org/en";
pub const DEFAULT_FAQ_URL: &str = "http://discordpy.readthedocs.io/en/latest/faq.html";
pub const DEFAULT_ISSUES_URL: &str = "https://github.com/Rapptz/discord.py/issues/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_AGENT: &str = "rtfm-backend/0.1";

impl LookupConfig {
    /// Builds the config from process environment variables.
    ///
    /// # Errors
    /// - [`DocLookupConfigError::InvalidNumber`] if the timeout is not a u64
    /// - [`DocLookupConfigError::InvalidFormat`] if a URL is not http(s)
    pub fn from_env() -> Result<Self, DocLookupConfigError> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_source<F>(get: F) -> Result<Self, DocLookupConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        let base = var("DOCS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base = base.trim_end_matches('/');

        let timeout_secs = match var("DOCS_HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| DocLookupConfigError::InvalidNumber {
                    var: "DOCS_HTTP_TIMEOUT_SECS",
                    reason: "expected u64",
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let cfg = LookupConfig {
            doc_sets: default_doc_sets(base),
            faq_url: var("DOCS_FAQ_URL").unwrap_or_else(|| DEFAULT_FAQ_URL.to_string()),
            issues_url: var("DOCS_ISSUES_URL").unwrap_or_else(|| DEFAULT_ISSUES_URL.to_string()),
            prefixes: AnchorPrefixes::default(),
            http: HttpConfig {
                timeout_secs,
                user_agent: var("DOCS_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            },
        };

        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            doc_sets: default_doc_sets(DEFAULT_BASE_URL),
            faq_url: DEFAULT_FAQ_URL.to_string(),
            issues_url: DEFAULT_ISSUES_URL.to_string(),
            prefixes: AnchorPrefixes::default(),
            http: HttpConfig {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
        }
    }
}

/// `rewrite` (current API, two pages) and `latest` (legacy, one page).
fn default_doc_sets(base: &str) -> Vec<DocSet> {
    vec![
        DocSet::new(
            "rewrite",
            format!("{base}/rewrite/"),
            vec![
                format!("{base}/rewrite/api.html"),
                format!("{base}/rewrite/ext/commands/api.html"),
            ],
            DocVariant::Current,
        ),
        DocSet::new(
            "latest",
            format!("{base}/latest/"),
            vec![format!("{base}/latest/api.html")],
            DocVariant::Legacy,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = LookupConfig::from_source(source(&[])).unwrap();
        assert_eq!(cfg, LookupConfig::default());
        assert_eq!(cfg.doc_sets[0].key, "rewrite");
        assert_eq!(cfg.doc_sets[0].pages.len(), 2);
        assert_eq!(
            cfg.doc_set("latest").unwrap().landing_url,
            "https://discordpy.readthedocs.org/en/latest/"
        );
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let cfg =
            LookupConfig::from_source(source(&[("DOCS_BASE_URL", "http://mirror.local/docs/")]))
                .unwrap();
        assert_eq!(
            cfg.doc_set("rewrite").unwrap().pages[1],
            "http://mirror.local/docs/rewrite/ext/commands/api.html"
        );
    }

    #[test]
    fn bad_timeout_is_reported() {
        let err = LookupConfig::from_source(source(&[("DOCS_HTTP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            DocLookupConfigError::InvalidNumber {
                var: "DOCS_HTTP_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = LookupConfig::from_source(source(&[("DOCS_USER_AGENT", "  ")])).unwrap();
        assert_eq!(cfg.http.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn non_http_faq_url_is_rejected() {
        let err = LookupConfig::from_source(source(&[("DOCS_FAQ_URL", "ftp://x/faq.html")]))
            .unwrap_err();
        assert!(matches!(
            err,
            DocLookupConfigError::InvalidFormat {
                var: "DOCS_FAQ_URL",
                ..
            }
        ));
    }

    #[test]
    fn unknown_doc_set_key() {
        let cfg = LookupConfig::default();
        assert!(matches!(
            cfg.doc_set("stable"),
            Err(DocLookupConfigError::UnknownDocSet(k)) if k == "stable"
        ));
    }
}
