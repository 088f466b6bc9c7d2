//! Fuzzy matching of street names against the registry.
//!
//! Scores are percentages in `0..=100` built on the indel similarity from
//! `rapidfuzz`: insertions and deletions only, so `100 * (len(a) + len(b) -
//! indel(a, b)) / (len(a) + len(b))`. The token-based scorers rearrange
//! words before comparing, which makes them tolerant of word order and of
//! extra qualifier words (`"Pasaje"`, `"Avenida"`).

use std::collections::BTreeSet;

use geo_gestion_address_models::{MatchResult, Scorer, StreetEntry};
use rapidfuzz::distance::indel;

use crate::normalize::normalize;
use crate::registry::StreetRegistry;

/// Character-level similarity of two strings, `0..=100`.
///
/// Returns 0 when either string is empty. Halves round to even.
#[must_use]
pub fn ratio(a: &str, b: &str) -> u8 {
    let total = a.chars().count() + b.chars().count();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Indel similarity is `total - distance`, i.e. twice the common subsequence.
    let similarity = indel::similarity(a.chars(), b.chars());
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let score = (100.0 * similarity as f64 / total as f64).round_ties_even() as u8;
    score
}

/// Sorts the whitespace-separated tokens of both strings, then compares.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Compares the shared tokens against each side's leftovers and keeps the
/// best of the three pairings.
///
/// `"AVENIDA INDEPENDENCIA"` vs `"INDEPENDENCIA"` scores 100 here, where
/// [`token_sort_ratio`] would penalize the extra word.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let sect = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));

    let combined_a = format!("{sect} {only_a}").trim().to_string();
    let combined_b = format!("{sect} {only_b}").trim().to_string();

    [
        ratio(&sect, &combined_a),
        ratio(&sect, &combined_b),
        ratio(&combined_a, &combined_b),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

fn join<'a>(tokens: impl Iterator<Item = &'a &'a str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

/// Scores two already-normalized strings with the given strategy.
#[must_use]
pub fn score_normalized(scorer: Scorer, a: &str, b: &str) -> u8 {
    match scorer {
        Scorer::TokenSort => token_sort_ratio(a, b),
        Scorer::TokenSet => token_set_ratio(a, b),
        Scorer::Ratio => ratio(a, b),
    }
}

/// Normalizes both strings, then scores them with the given strategy.
#[must_use]
pub fn score(scorer: Scorer, a: &str, b: &str) -> u8 {
    score_normalized(scorer, &normalize(a), &normalize(b))
}

/// Finds the highest-scoring registry entry for `query`.
///
/// `query` may be raw or already normalized. Ties keep the earliest entry
/// in registry order. Returns `None` only for an empty registry; the
/// caller decides whether the score is good enough.
#[must_use]
pub fn best_match<'a>(
    query: &str,
    registry: &'a StreetRegistry,
    scorer: Scorer,
) -> Option<MatchResult<'a>> {
    let key = normalize(query);
    let mut best: Option<MatchResult<'a>> = None;

    for entry in registry.entries() {
        let score = score_normalized(scorer, &key, &entry.normalized_key);
        if best.is_none_or(|b| score > b.score) {
            best = Some(MatchResult {
                candidate: entry,
                score,
            });
        }
    }

    best
}

/// Returns up to `limit` registry entries ordered by descending score.
///
/// Entries with equal scores keep registry order.
#[must_use]
pub fn rank_matches<'a>(
    query: &str,
    registry: &'a StreetRegistry,
    scorer: Scorer,
    limit: usize,
) -> Vec<MatchResult<'a>> {
    let key = normalize(query);
    let mut scored: Vec<MatchResult<'a>> = registry
        .entries()
        .iter()
        .map(|entry: &'a StreetEntry| MatchResult {
            candidate: entry,
            score: score_normalized(scorer, &key, &entry.normalized_key),
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}
