//! `##123` issue references in free text.

use std::sync::LazyLock;

use regex::Regex;

static ISSUE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##(?P<number>[0-9]+)").expect("issue pattern compiles"));

/// Link for the first `##<number>` in `text`, appended to `issues_url`.
pub fn issue_link(text: &str, issues_url: &str) -> Option<String> {
    ISSUE_REF
        .captures(text)
        .map(|caps| format!("{issues_url}{}", &caps["number"]))
}
