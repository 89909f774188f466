//! Lookup facade: normalization → cached index → fuzzy ranking.
//!
//! Construct once, wrap in `Arc` and share it. Queries never mutate the
//! caches except through the lazy build; [`DocLookupService::rebuild`] and
//! [`DocLookupService::rebuild_faq`] reset a cache so the next query
//! fetches the pages again.

use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::{
    cache::{CacheState, IndexCache},
    config::{DocSet, LookupConfig},
    errors::{BuildFailure, DocLookupError, DocLookupResult},
    extract::{extract_api_index, extract_faq_index},
    fetcher::{HttpPageFetcher, PageFetcher},
    fuzzy::{self, DEFAULT_LIMIT, Scorer},
    index::{DocIndex, IndexEntry},
    issues,
    normalize::normalize_query,
};

/// Identifier lookups always return the best effort top results.
pub const API_SCORE_CUTOFF: u8 = 0;
/// FAQ lookups drop weak matches entirely.
pub const FAQ_SCORE_CUTOFF: u8 = 40;

/// Result of an identifier lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Empty query: the doc set's landing page.
    Landing(String),
    /// Ranked `(identifier, url)` pairs, best first, at most five.
    Matches(Vec<IndexEntry>),
    /// The index holds nothing to rank.
    NothingFound,
}

/// One ranked FAQ entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqMatch {
    pub question: String,
    pub score: u8,
    pub url: String,
}

/// Result of a FAQ lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqOutcome {
    /// Empty query: the FAQ page itself.
    Landing(String),
    /// Questions scoring at least [`FAQ_SCORE_CUTOFF`], best first.
    Matches(Vec<FaqMatch>),
    /// No question was close enough.
    NothingFound,
}

/// Documentation lookup service over a [`PageFetcher`].
#[derive(Debug)]
pub struct DocLookupService<F = HttpPageFetcher> {
    cfg: LookupConfig,
    fetcher: F,
    api: IndexCache<String, BuildFailure>,
    faq: IndexCache<(), BuildFailure>,
}

impl DocLookupService<HttpPageFetcher> {
    /// Creates a service fetching pages over HTTP.
    pub fn from_config(cfg: LookupConfig) -> DocLookupResult<Self> {
        let fetcher = HttpPageFetcher::new(&cfg.http)?;
        Self::with_fetcher(cfg, fetcher)
    }
}

impl<F: PageFetcher> DocLookupService<F> {
    /// Creates a service over a custom fetcher. Caches start empty.
    pub fn with_fetcher(cfg: LookupConfig, fetcher: F) -> DocLookupResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            fetcher,
            api: IndexCache::new(),
            faq: IndexCache::new(),
        })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.cfg
    }

    /// Looks up `raw_query` in the doc set `key`.
    ///
    /// The first query for a key builds its index; a build failure is
    /// returned as [`DocLookupError::Build`] and the next query retries.
    #[instrument(level = "debug", skip(self))]
    pub async fn lookup(&self, key: &str, raw_query: &str) -> DocLookupResult<LookupOutcome> {
        let set = self.cfg.doc_set(key)?;

        if raw_query.trim().is_empty() {
            return Ok(LookupOutcome::Landing(set.landing_url.clone()));
        }

        let query = normalize_query(raw_query, set.variant);
        let index = self
            .api
            .get_or_build(&set.key, || self.build_api_index(set))
            .await
            .map_err(|e| DocLookupError::build("rtfm", e))?;

        let hits = fuzzy::find(
            &query,
            index.entries(),
            |e| e.key.as_str(),
            Scorer::WeightedRatio,
            DEFAULT_LIMIT,
            API_SCORE_CUTOFF,
        );

        if hits.is_empty() {
            return Ok(LookupOutcome::NothingFound);
        }
        Ok(LookupOutcome::Matches(
            hits.into_iter().map(|h| h.item.clone()).collect(),
        ))
    }

    /// Looks up `raw_query` among the FAQ questions.
    #[instrument(level = "debug", skip(self))]
    pub async fn faq(&self, raw_query: &str) -> DocLookupResult<FaqOutcome> {
        let query = raw_query.trim();
        if query.is_empty() {
            return Ok(FaqOutcome::Landing(self.cfg.faq_url.clone()));
        }

        let index = self
            .faq
            .get_or_build(&(), || self.build_faq_index())
            .await
            .map_err(|e| DocLookupError::build("faq", e))?;

        let hits = fuzzy::find(
            query,
            index.entries(),
            |e| e.key.as_str(),
            Scorer::PartialRatio,
            DEFAULT_LIMIT,
            FAQ_SCORE_CUTOFF,
        );

        if hits.is_empty() {
            return Ok(FaqOutcome::NothingFound);
        }
        Ok(FaqOutcome::Matches(
            hits.into_iter()
                .map(|h| FaqMatch {
                    question: h.item.key.clone(),
                    score: h.score,
                    url: h.item.url.clone(),
                })
                .collect(),
        ))
    }

    /// Discards the index of doc set `key`; the next lookup rebuilds it.
    ///
    /// A build already running is allowed to finish for its current
    /// waiters, but its index is not kept.
    pub fn rebuild(&self, key: &str) -> DocLookupResult<()> {
        let set = self.cfg.doc_set(key)?;
        self.api.invalidate(&set.key);
        info!(docset = %set.key, "lookup index reset");
        Ok(())
    }

    /// Discards the FAQ index; the next FAQ query rebuilds it.
    pub fn rebuild_faq(&self) {
        self.faq.invalidate(&());
        info!("faq index reset");
    }

    pub fn state(&self, key: &str) -> DocLookupResult<CacheState> {
        let set = self.cfg.doc_set(key)?;
        Ok(self.api.state(&set.key))
    }

    pub fn faq_state(&self) -> CacheState {
        self.faq.state(&())
    }

    /// Link for a `##<number>` issue reference in `text`.
    pub fn issue_link(&self, text: &str) -> Option<String> {
        issues::issue_link(text, &self.cfg.issues_url)
    }

    /// Fetches and merges every page of `set` in declared order.
    ///
    /// Stops at the first failing page; earlier pages are discarded.
    async fn build_api_index(&self, set: &DocSet) -> Result<DocIndex, BuildFailure> {
        let started = Instant::now();
        info!(docset = %set.key, pages = set.pages.len(), "building lookup index");

        let mut index = DocIndex::new();
        for page in &set.pages {
            let html = self.fetcher.fetch(page).await.inspect_err(|e| {
                warn!(docset = %set.key, %page, error = %e, "lookup index build aborted");
            })?;
            let page_index = extract_api_index(&html, page, &self.cfg.prefixes)?;
            index.extend(page_index);
        }

        info!(
            docset = %set.key,
            entries = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "lookup index built"
        );
        Ok(index)
    }

    async fn build_faq_index(&self) -> Result<DocIndex, BuildFailure> {
        let started = Instant::now();
        let url = self.cfg.faq_url.as_str();

        let html = self.fetcher.fetch(url).await.inspect_err(|e| {
            warn!(%url, error = %e, "faq index build aborted");
        })?;
        let index = extract_faq_index(&html, url)?;

        info!(
            entries = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "faq index built"
        );
        Ok(index)
    }
}
