//! Plain-text rendering of lookup results for chat replies.

use crate::service::{FaqOutcome, LookupOutcome};

pub const NOTHING_FOUND_RTFM: &str = "Could not find anything. Sorry.";
pub const NOTHING_FOUND_FAQ: &str = "Nothing found...";

/// One `[identifier](url)` markdown link per line.
pub fn render_lookup(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Landing(url) => url.clone(),
        LookupOutcome::Matches(entries) => entries
            .iter()
            .map(|e| format!("[{}]({})", e.key, e.url))
            .collect::<Vec<_>>()
            .join("\n"),
        LookupOutcome::NothingFound => NOTHING_FOUND_RTFM.to_string(),
    }
}

/// Bold question followed by its link, one block per match.
pub fn render_faq(outcome: &FaqOutcome) -> String {
    match outcome {
        FaqOutcome::Landing(url) => url.clone(),
        FaqOutcome::Matches(hits) => hits
            .iter()
            .map(|h| format!("**{}**\n{}", h.question, h.url))
            .collect::<Vec<_>>()
            .join("\n"),
        FaqOutcome::NothingFound => NOTHING_FOUND_FAQ.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexEntry;
    use crate::service::FaqMatch;

    #[test]
    fn lookup_matches_are_markdown_links() {
        let out = LookupOutcome::Matches(vec![
            IndexEntry {
                key: "Message".into(),
                url: "https://d/api.html#discord.Message".into(),
            },
            IndexEntry {
                key: "Message.content".into(),
                url: "https://d/api.html#discord.Message.content".into(),
            },
        ]);
        assert_eq!(
            render_lookup(&out),
            "[Message](https://d/api.html#discord.Message)\n\
             [Message.content](https://d/api.html#discord.Message.content)"
        );
    }

    #[test]
    fn empty_outcomes_have_distinct_texts() {
        assert_eq!(render_lookup(&LookupOutcome::NothingFound), NOTHING_FOUND_RTFM);
        assert_eq!(render_faq(&FaqOutcome::NothingFound), NOTHING_FOUND_FAQ);
        assert_eq!(
            render_faq(&FaqOutcome::Landing("http://d/faq.html".into())),
            "http://d/faq.html"
        );
    }

    #[test]
    fn faq_blocks() {
        let out = FaqOutcome::Matches(vec![FaqMatch {
            question: "How do I get my bot's token?".into(),
            score: 78,
            url: "http://d/faq.html#token".into(),
        }]);
        assert_eq!(
            render_faq(&out),
            "**How do I get my bot's token?**\nhttp://d/faq.html#token"
        );
    }
}
