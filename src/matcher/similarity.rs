//! String similarity scores in the range `[0, 100]`.
//!
//! All functions expect input that already went through
//! [`default_process`](crate::utils::string::default_process). Two empty
//! strings are identical (100); an empty string against a non-empty one
//! scores 0.

use std::collections::BTreeSet;
use crate::utils::string::sorted_tokens;

// Penalty applied to token based scores inside `weighted_ratio`.
const UNBASE_SCALE: f64 = 0.95;

fn empty_score(a: &str, b: &str) -> Option<f64> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Some(100.0),
        (true, false) | (false, true) => Some(0.0),
        _ => None,
    }
}

/// Length of the longest common subsequence, one DP row over the shorter side.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0usize; short.len() + 1];
    for &lc in long {
        let mut diag = 0;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[short.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

/// Normalized Indel similarity: `100 * 2 * LCS / (len_a + len_b)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 100.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against every same-length window
/// of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    if let Some(score) = empty_score(a, b) {
        return score;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if short.len() == long.len() {
        return ratio_chars(short, long);
    }

    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        let score = ratio_chars(short, window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// [`ratio`] of the whitespace tokens after sorting them.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    if let Some(score) = empty_score(a, b) {
        return score;
    }
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

struct TokenSets<'a> {
    intersection: Vec<&'a str>,
    only_a: Vec<&'a str>,
    only_b: Vec<&'a str>,
}

impl<'a> TokenSets<'a> {
    fn new(a: &'a str, b: &'a str) -> Self {
        let set_a: BTreeSet<&str> = a.split_whitespace().collect();
        let set_b: BTreeSet<&str> = b.split_whitespace().collect();
        Self {
            intersection: set_a.intersection(&set_b).copied().collect(),
            only_a: set_a.difference(&set_b).copied().collect(),
            only_b: set_b.difference(&set_a).copied().collect(),
        }
    }
}

fn join_parts(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

/// Token set comparison: 100 when one token set contains the other,
/// otherwise the best ratio between the shared tokens and each side's rest.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    if let Some(score) = empty_score(a, b) {
        return score;
    }
    let sets = TokenSets::new(a, b);
    if !sets.intersection.is_empty() && (sets.only_a.is_empty() || sets.only_b.is_empty()) {
        return 100.0;
    }

    let sect = sets.intersection.join(" ");
    let with_a = join_parts(&sect, &sets.only_a.join(" "));
    let with_b = join_parts(&sect, &sets.only_b.join(" "));

    let mut best = ratio(&with_a, &with_b);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &with_a)).max(ratio(&sect, &with_b));
    }
    best
}

/// Partial variant of the token scores: 100 as soon as the strings share a
/// token, else the best partial ratio over sorted tokens or token differences.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    if let Some(score) = empty_score(a, b) {
        return score;
    }
    let sets = TokenSets::new(a, b);
    if !sets.intersection.is_empty() {
        return 100.0;
    }
    let sorted = partial_ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "));
    let diff = partial_ratio(&sets.only_a.join(" "), &sets.only_b.join(" "));
    sorted.max(diff)
}

/// Weighted combination of the other scores, tolerant of case, word order
/// and strings of very different length.
///
/// Similar lengths use the whole-string ratio and the token ratios; once one
/// string is 1.5x longer than the other the partial ratios take over, scaled
/// down further when the length ratio reaches 8.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    if let Some(score) = empty_score(a, b) {
        return score;
    }
    if a == b {
        return 100.0;
    }

    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let base = ratio(a, b);
    if len_ratio < 1.5 {
        let token = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return base.max(token * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    base.max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}
