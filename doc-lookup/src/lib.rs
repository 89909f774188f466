//! Documentation lookup: fuzzy search over API identifiers and FAQ
//! questions scraped from remote HTML pages.
//!
//! Indexes are built lazily on the first query per doc set, shared between
//! callers and only replaced as a whole.

pub mod cache;
pub mod config;
mod errors;
pub mod extract;
pub mod fetcher;
pub mod fuzzy;
pub mod index;
mod issues;
pub mod normalize;
pub mod render;
pub mod service;
pub mod telemetry;

pub use cache::CacheState;
pub use config::{DocSet, DocVariant, LookupConfig};
pub use errors::{
    BuildFailure, DocLookupConfigError, DocLookupError, DocLookupFetchError, DocLookupParseError,
    DocLookupResult,
};
pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use index::{DocIndex, IndexEntry};
pub use issues::issue_link;
pub use render::{render_faq, render_lookup};
pub use service::{DocLookupService, FaqMatch, FaqOutcome, LookupOutcome};
