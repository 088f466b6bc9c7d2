#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for street-name correction.
//!
//! This crate contains only data types and simple conversions. It has no
//! heavyweight dependencies (no regex, no HTTP, no transliteration tables).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default minimum similarity score (out of 100) required before a fuzzy
/// match is applied as a correction.
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Highest possible similarity score.
pub const MAX_SCORE: u8 = 100;

/// A canonical street name paired with its comparison key.
///
/// `normalized_key` must equal the normalized form of `canonical_name`.
/// Entries are built by the street registry, which computes the key once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetEntry {
    /// The official street name as published (e.g., `"Tres Oriente"`).
    pub canonical_name: String,
    /// Accent-free, upper-cased, punctuation-free form used for matching.
    pub normalized_key: String,
}

/// A raw address split into its street-name text and trailing number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAddress {
    /// Everything before the trailing number, trimmed.
    pub street_text: String,
    /// The trailing digit run, if the address ended in one.
    pub number: Option<String>,
}

impl SplitAddress {
    /// Rebuilds a single-line address from the parts, joining the street
    /// text and number with one space.
    #[must_use]
    pub fn recompose(&self) -> String {
        recompose(&self.street_text, self.number.as_deref())
    }
}

/// Joins a street name and an optional house number with a single space.
#[must_use]
pub fn recompose(street: &str, number: Option<&str>) -> String {
    match number {
        Some(number) if !number.is_empty() => format!("{street} {number}").trim().to_string(),
        _ => street.trim().to_string(),
    }
}

/// The best registry candidate for a query and its similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    /// The registry entry that scored highest.
    pub candidate: &'a StreetEntry,
    /// Similarity in `0..=100`.
    pub score: u8,
}

impl MatchResult<'_> {
    /// Whether this match clears the given acceptance threshold.
    #[must_use]
    pub const fn is_accepted(&self, threshold: u8) -> bool {
        self.score >= threshold
    }
}

/// Outcome of correcting one raw address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectedAddress {
    /// The address to hand to the geocoder.
    pub text: String,
    /// Whether the street name was replaced by a registry entry.
    pub was_corrected: bool,
}

impl CorrectedAddress {
    /// Wraps text that was passed through without correction.
    #[must_use]
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            was_corrected: false,
        }
    }

    /// Returns `true` if there is nothing to geocode.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// String-similarity strategy used to score a query against registry keys.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Scorer {
    /// Sort the words of both strings, then compare. Insensitive to word
    /// order.
    #[default]
    TokenSort,
    /// Compare the shared words against each side's leftovers. Tolerant of
    /// extra qualifier words on either side.
    TokenSet,
    /// Plain character-level similarity of the whole strings.
    Ratio,
}
