//! Log output for doc-lookup.
//!
//! The binary owns the global subscriber and composes [`layer`] into it.
//! The layer shows events from this crate plus warnings from the HTTP
//! client, since those explain most failed index builds. The crate's level
//! can be tuned on its own through `DOC_LOOKUP_LOG`.

use std::io::{self, IsTerminal};

use tracing::{Level, Metadata};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "doc_lookup";

/// Environment variable with the level for this crate's events.
pub const LEVEL_ENV: &str = "DOC_LOOKUP_LOG";

/// Transport crates whose warnings are relevant to page fetches.
const HTTP_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls"];

/// `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct UtcSeconds;

impl FormatTime for UtcSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Whether the doc-lookup layer renders an event with this metadata.
fn is_relevant(meta: &Metadata<'_>) -> bool {
    let target = meta.target();
    if target.starts_with(TARGET_PREFIX) {
        return true;
    }
    *meta.level() <= Level::WARN && HTTP_TARGETS.iter().any(|t| target.starts_with(t))
}

/// Compact single-line layer for index builds and lookups.
///
/// Span close events are logged so `#[instrument]`ed fetches report their
/// duration. ANSI colors only when stdout is a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    fmt::layer()
        .with_timer(UtcSeconds)
        .with_level(true)
        .with_target(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(filter::filter_fn(is_relevant))
}

/// `doc_lookup=<level>` directive.
pub fn level_directive(level: Level) -> Directive {
    format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase())
        .parse()
        .unwrap_or_else(|_| Directive::from(LevelFilter::from_level(level)))
}

fn parse_level(raw: &str) -> Option<Level> {
    raw.trim().parse().ok()
}

/// Level from `DOC_LOOKUP_LOG`, or `fallback` when unset or unparsable.
pub fn level_from_env(fallback: Level) -> Level {
    std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|raw| parse_level(&raw))
        .unwrap_or(fallback)
}

/// `RUST_LOG` (or `default`) plus a crate-level override for doc-lookup.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    base.add_directive(level_directive(level))
}
