//! HTML anchor extraction for API and FAQ pages.
//!
//! Pages are parsed into a `scraper` tree and walked with two fixed
//! selectors:
//! - API pages: header-link anchors inside definition terms (`<dt>`)
//! - FAQ page:  question links two list levels below `div#questions`

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::{config::AnchorPrefixes, errors::DocLookupParseError, index::DocIndex};

const API_ANCHOR: &str = "dt > a.headerlink";
const FAQ_CONTAINER: &str = "div#questions";
const FAQ_ANCHOR: &str = "div#questions > ul.simple ul > li > a";

fn selector(src: &'static str) -> Result<Selector, DocLookupParseError> {
    Selector::parse(src).map_err(|e| DocLookupParseError::InvalidSelector {
        selector: src,
        reason: format!("{e:?}"),
    })
}

/// Turns an anchor `href` into the identifier a user would type.
///
/// Each prefix is removed at most once, namespace first.
pub fn identifier_from_href(href: &str, prefixes: &AnchorPrefixes) -> String {
    let id = href
        .strip_prefix(prefixes.namespace.as_str())
        .unwrap_or(href);
    id.strip_prefix(prefixes.sub_namespace.as_str())
        .unwrap_or(id)
        .to_string()
}

/// Extracts `identifier -> page_url + href` from an API reference page.
///
/// # Errors
/// [`DocLookupParseError::MissingNode`] when the page has no header-linked
/// definition at all (not an API page, or the markup changed).
pub fn extract_api_index(
    html: &str,
    page_url: &str,
    prefixes: &AnchorPrefixes,
) -> Result<DocIndex, DocLookupParseError> {
    let doc = Html::parse_document(html);
    let anchors = selector(API_ANCHOR)?;

    let mut index = DocIndex::new();
    let mut seen = 0usize;
    for node in doc.select(&anchors) {
        seen += 1;
        let Some(href) = node.value().attr("href") else {
            continue;
        };
        index.insert(
            identifier_from_href(href, prefixes),
            format!("{page_url}{href}"),
        );
    }

    if seen == 0 {
        return Err(DocLookupParseError::MissingNode {
            url: page_url.to_string(),
            what: "header-linked definitions",
        });
    }

    debug!(url = %page_url, anchors = seen, entries = index.len(), "api page indexed");
    Ok(index)
}

/// Extracts `question -> page_url + href` from the FAQ page.
///
/// An existing but empty question list yields an empty index.
///
/// # Errors
/// [`DocLookupParseError::MissingNode`] when `div#questions` is absent.
pub fn extract_faq_index(html: &str, page_url: &str) -> Result<DocIndex, DocLookupParseError> {
    let doc = Html::parse_document(html);

    if doc.select(&selector(FAQ_CONTAINER)?).next().is_none() {
        return Err(DocLookupParseError::MissingNode {
            url: page_url.to_string(),
            what: "questions container",
        });
    }

    let mut index = DocIndex::new();
    for node in doc.select(&selector(FAQ_ANCHOR)?) {
        let Some(href) = node.value().attr("href") else {
            continue;
        };
        let question = anchor_text(&node);
        if question.is_empty() {
            continue;
        }
        index.insert(question, format!("{page_url}{}", href.trim()));
    }

    debug!(url = %page_url, entries = index.len(), "faq page indexed");
    Ok(index)
}

/// Concatenated descendant text, trimmed.
fn anchor_text(node: &ElementRef<'_>) -> String {
    node.text().collect::<String>().trim().to_string()
}
