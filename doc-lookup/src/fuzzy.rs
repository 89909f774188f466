//! Approximate string matching used to rank index keys against a query.
//!
//! Scores are integers in `0..=100`, computed on lowercased text:
//! - [`ratio`]: indel similarity, `2 * LCS / (len_a + len_b)`
//! - [`partial_ratio`]: best [`ratio`] of the shorter string against every
//!   same-length window of the longer one
//! - [`weighted_ratio`]: [`ratio`] for similar lengths, otherwise the
//!   scaled-down [`partial_ratio`] if that is higher
//!
//! [`find`] ranks candidates by score (descending) and applies a cutoff and
//! a result limit. Among equal [`Scorer::WeightedRatio`] scores, keys whose
//! leading dotted segments spell the query (`Message` → `Message.content`)
//! come first; remaining ties keep input order.

/// Default number of results returned by lookups.
pub const DEFAULT_LIMIT: usize = 5;

/// Which similarity function [`find`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scorer {
    Ratio,
    PartialRatio,
    WeightedRatio,
}

impl Scorer {
    pub fn score(self, query: &str, choice: &str) -> u8 {
        match self {
            Scorer::Ratio => ratio(query, choice),
            Scorer::PartialRatio => partial_ratio(query, choice),
            Scorer::WeightedRatio => weighted_ratio(query, choice),
        }
    }

    /// Secondary rank among equal scores.
    fn prefers(self, query: &str, choice: &str) -> bool {
        match self {
            Scorer::WeightedRatio => starts_with_segment(query, choice),
            Scorer::Ratio | Scorer::PartialRatio => false,
        }
    }
}

/// `choice` begins with `query` followed by a `.` separator, ignoring case.
pub fn starts_with_segment(query: &str, choice: &str) -> bool {
    let query = query.to_lowercase();
    let choice = choice.to_lowercase();
    !query.is_empty()
        && choice
            .strip_prefix(query.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
}

/// A ranked candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored<'a, T> {
    pub item: &'a T,
    pub score: u8,
}

/// Ranks `candidates` by `scorer(query, key_fn(candidate))`.
///
/// Keeps scores `>= score_cutoff`, sorts by descending score and returns at
/// most `limit`. Equal scores are ordered by [`Scorer`]'s secondary rank,
/// then by input order.
pub fn find<'a, T, I, K>(
    query: &str,
    candidates: I,
    key_fn: K,
    scorer: Scorer,
    limit: usize,
    score_cutoff: u8,
) -> Vec<Scored<'a, T>>
where
    I: IntoIterator<Item = &'a T>,
    K: Fn(&T) -> &str,
{
    let mut ranked: Vec<(Scored<'a, T>, bool)> = candidates
        .into_iter()
        .filter_map(|item| {
            let key = key_fn(item);
            let score = scorer.score(query, key);
            (score >= score_cutoff).then(|| (Scored { item, score }, scorer.prefers(query, key)))
        })
        .collect();

    // `sort_by` is stable: full ties stay in mapping order.
    ranked.sort_by(|(a, a_pref), (b, b_pref)| {
        b.score.cmp(&a.score).then(b_pref.cmp(a_pref))
    });
    ranked.truncate(limit);
    ranked.into_iter().map(|(scored, _)| scored).collect()
}

fn lowered_chars(s: &str) -> Vec<char> {
    s.to_lowercase().chars().collect()
}

/// Length of the longest common subsequence.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let lcs = lcs_len(a, b);
    ((200 * lcs + total / 2) / total) as u8
}

fn partial_ratio_chars(a: &[char], b: &[char]) -> u8 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }
    if short.len() == long.len() {
        return ratio_chars(short, long);
    }

    let mut best = 0u8;
    for window in long.windows(short.len()) {
        best = best.max(ratio_chars(short, window));
        if best == 100 {
            break;
        }
    }
    best
}

/// Indel similarity of the two strings, case-insensitive.
pub fn ratio(a: &str, b: &str) -> u8 {
    ratio_chars(&lowered_chars(a), &lowered_chars(b))
}

/// Best window match of the shorter string inside the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    partial_ratio_chars(&lowered_chars(a), &lowered_chars(b))
}

/// Blends [`ratio`] and [`partial_ratio`] depending on the length ratio.
///
/// Exact matches score 100 while a query that is only a substring of a
/// much longer key tops out at 90, so `Message` ranks above
/// `Message.content` for the query `Message`.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let a = lowered_chars(a);
    let b = lowered_chars(b);
    let (min, max) = (a.len().min(b.len()), a.len().max(b.len()));
    if min == 0 {
        return 0;
    }

    let base = ratio_chars(&a, &b);
    let len_ratio = max as f64 / min as f64;
    if len_ratio < 1.5 {
        return base;
    }

    let scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
    let partial = (f64::from(partial_ratio_chars(&a, &b)) * scale).round() as u8;
    base.max(partial)
}
