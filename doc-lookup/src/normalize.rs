//! Query normalization for identifier lookups.
//!
//! Raw queries are what people type in chat: `msg.content`, `send`,
//! `vc disconnect`. Before fuzzy matching they are rewritten towards the
//! identifiers found in the docs:
//! 1. spaces become `_` (identifiers never contain spaces)
//! 2. a bare message-destination method (`send`) becomes `abc.Messageable.send`
//! 3. otherwise short aliases (`msg`, `vc`, ...) are expanded word by word
//!
//! Steps 2 and 3 only run for the current doc variant.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::DocVariant;

/// Qualified name of the message-destination capability set.
pub const CAPABILITY_SET: &str = "abc.Messageable";

/// Public members of [`CAPABILITY_SET`], in declared (alphabetical) order.
pub const CAPABILITY_MEMBERS: &[&str] = &[
    "fetch_message",
    "history",
    "pins",
    "send",
    "trigger_typing",
    "typing",
];

/// Informal shorthand → canonical type name.
pub const ALIASES: &[(&str, &str)] = &[
    ("vc", "VoiceClient"),
    ("msg", "Message"),
    ("color", "Colour"),
    ("perm", "Permissions"),
    ("channel", "TextChannel"),
    ("chan", "TextChannel"),
];

/// One alternation over every alias so a replacement is never re-scanned.
static ALIAS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = ALIASES
        .iter()
        .map(|(k, _)| format!(r"\b{}\b", regex::escape(k)))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("alias pattern compiles")
});

/// Full normalization pipeline for `variant`.
pub fn normalize_query(raw: &str, variant: DocVariant) -> String {
    let query = raw.trim().replace(' ', "_");
    match variant {
        DocVariant::Current => resolve_aliases(&query),
        DocVariant::Legacy => query,
    }
}

/// Capability-name resolution, falling back to alias substitution.
pub fn resolve_aliases(query: &str) -> String {
    if let Some(qualified) = resolve_capability(query) {
        return qualified;
    }
    substitute_aliases(query)
}

/// `send` / `SEND` → `abc.Messageable.send`; first declared member wins.
pub fn resolve_capability(query: &str) -> Option<String> {
    let lowered = query.to_lowercase();
    CAPABILITY_MEMBERS
        .iter()
        .find(|name| **name == lowered)
        .map(|name| format!("{CAPABILITY_SET}.{name}"))
}

/// Replaces every whole-word alias occurrence (case-sensitive).
pub fn substitute_aliases(query: &str) -> String {
    ALIAS_PATTERN
        .replace_all(query, |caps: &Captures<'_>| {
            let word = &caps[0];
            ALIASES
                .iter()
                .find(|(k, _)| *k == word)
                .map(|(_, v)| *v)
                .unwrap_or(word)
                .to_string()
        })
        .into_owned()
}
