//! Fuzzy similarity scorers for canonical name keys
//!
//! Scores are on a 0-100 scale. The default scorer is a token-set ratio:
//! word order and repeated words do not matter, and a name whose words are
//! all contained in the other ("adams" vs "john adams") scores 100.

use gs_common::NameScorer;
use std::collections::BTreeSet;

/// Pairwise similarity on the 0-100 scale
pub trait Similarity: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, a: &str, b: &str) -> f64;
}

/// Token-set ratio over Indel (insertion/deletion) similarity
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetRatio;

impl Similarity for TokenSetRatio {
    fn name(&self) -> &'static str {
        "token_set_ratio"
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        token_set_ratio(a, b)
    }
}

/// Normalized Levenshtein similarity scaled to 0-100
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl Similarity for LevenshteinRatio {
    fn name(&self) -> &'static str {
        "normalized_levenshtein"
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b) * 100.0
    }
}

/// Scorer selected by configuration
pub fn scorer_for(kind: NameScorer) -> Box<dyn Similarity> {
    match kind {
        NameScorer::TokenSet => Box::new(TokenSetRatio),
        NameScorer::Levenshtein => Box::new(LevenshteinRatio),
    }
}

/// Token-set ratio of two whitespace-tokenized strings
///
/// Tokens are deduplicated and split into the shared set and the two
/// one-sided differences, each joined in sorted order. The score is the best
/// of: difference vs difference, shared vs shared+diff(a), shared vs
/// shared+diff(b). Empty input on either side scores 0.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let shared: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let only_a = only_a.join(" ");
    let only_b = only_b.join(" ");
    let a_len = only_a.chars().count();
    let b_len = only_b.chars().count();
    let shared_len = shared.join(" ").chars().count();

    // Lengths of "shared + diff" strings; the joining space exists only when
    // there is something shared
    let sep = usize::from(shared_len != 0);
    let shared_a_len = shared_len + sep + a_len;
    let shared_b_len = shared_len + sep + b_len;

    let diff_ratio = norm_distance(indel_distance(&only_a, &only_b), shared_a_len + shared_b_len);
    if shared_len == 0 {
        return diff_ratio;
    }

    // shared vs shared+diff differ only by the appended diff
    let shared_a_ratio = norm_distance(sep + a_len, shared_len + shared_a_len);
    let shared_b_ratio = norm_distance(sep + b_len, shared_len + shared_b_len);

    diff_ratio.max(shared_a_ratio).max(shared_b_ratio)
}

/// Indel similarity of two strings on the 0-100 scale
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    let lensum = a.chars().count() + b.chars().count();
    norm_distance(indel_distance(a, b), lensum)
}

/// Minimum insertions plus deletions turning `a` into `b`
pub fn indel_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    a.len() + b.len() - 2 * lcs_len(&a, &b)
}

/// Longest common subsequence length, two-row table
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

fn norm_distance(dist: usize, lensum: usize) -> f64 {
    if lensum == 0 {
        return 100.0;
    }
    100.0 - 100.0 * dist as f64 / lensum as f64
}
