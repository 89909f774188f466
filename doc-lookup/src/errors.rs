//! Crate-wide error hierarchy for doc-lookup.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type DocLookupResult<T> = Result<T, DocLookupError>;

/// Root error type for the doc-lookup crate.
#[derive(Debug, Error)]
pub enum DocLookupError {
    /// Building an index failed; nothing was installed in the cache.
    ///
    /// The display text is meant to be shown to the end user as-is.
    #[error("Cannot build {target} lookup table, try again later.")]
    Build {
        /// What was being built (`rtfm` / `faq`).
        target: &'static str,
        /// Underlying fetch or parse failure.
        #[source]
        source: BuildFailure,
    },

    /// Configuration problems (bad URLs, unknown doc set keys, etc.).
    #[error(transparent)]
    Config(#[from] DocLookupConfigError),
}

/// Reason an index build was abandoned.
///
/// Cloned to every query that waited on the failed build.
#[derive(Debug, Clone, Error)]
pub enum BuildFailure {
    /// A page could not be downloaded.
    #[error(transparent)]
    Fetch(#[from] DocLookupFetchError),

    /// A page was downloaded but did not have the expected structure.
    #[error(transparent)]
    Parse(#[from] DocLookupParseError),
}

/// Page fetch failure.
#[derive(Debug, Clone, Error)]
pub enum DocLookupFetchError {
    /// Server answered with anything other than `200 OK`.
    #[error("non-200 status {status} from {url}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// Timeout at transport level.
    #[error("timeout while fetching {url}")]
    Timeout {
        /// Request URL.
        url: String,
    },

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("transport failure for {url}: {reason}")]
    Transport {
        /// Request URL.
        url: String,
        /// Rendered transport error.
        reason: String,
    },

    /// Body could not be read or decoded as UTF-8.
    #[error("failed to decode body of {url}: {reason}")]
    Decode {
        /// Request URL.
        url: String,
        /// Rendered decode error.
        reason: String,
    },
}

/// HTML structure errors raised by the extractors.
#[derive(Debug, Clone, Error)]
pub enum DocLookupParseError {
    /// A CSS selector failed to compile.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        /// Selector source text.
        selector: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The page lacks the nodes the extractor relies on.
    #[error("page {url} has no {what}")]
    MissingNode {
        /// Page URL.
        url: String,
        /// Human-readable description of the missing structure.
        what: &'static str,
    },
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum DocLookupConfigError {
    /// A number failed to parse (timeouts, limits).
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name.
        var: &'static str,
        /// Human-readable reason.
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("invalid format in {var}: {value}")]
    InvalidFormat {
        /// Variable or field name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// Query addressed a doc set that is not configured.
    #[error("unknown doc set: {0}")]
    UnknownDocSet(String),

    /// A doc set was declared without any page.
    #[error("doc set {0} has no pages")]
    EmptyDocSet(String),

    /// HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    HttpClient(String),
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for DocLookupConfigError {
    fn from(e: reqwest::Error) -> Self {
        DocLookupConfigError::HttpClient(e.to_string())
    }
}

impl DocLookupFetchError {
    /// Maps a `reqwest` transport error for `url` into the fetch taxonomy.
    pub fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return DocLookupFetchError::Timeout {
                url: url.to_string(),
            };
        }

        if let Some(status) = e.status() {
            return DocLookupFetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            };
        }

        if e.is_decode() || e.is_body() {
            return DocLookupFetchError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            };
        }

        DocLookupFetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

impl DocLookupError {
    /// Wraps a fetch/parse failure of a `target` build.
    pub fn build(target: &'static str, source: impl Into<BuildFailure>) -> Self {
        DocLookupError::Build {
            target,
            source: source.into(),
        }
    }

    /// True when the error came out of an index build.
    pub fn is_build_failure(&self) -> bool {
        matches!(self, DocLookupError::Build { .. })
    }
}
