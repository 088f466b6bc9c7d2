//! Text normalization for street-name comparison.
//!
//! Provides a deterministic normalization pipeline applied symmetrically to
//! registry entries and user input, so that `"Tres Ote."`, `"tres ote"` and
//! `"TRÉS  OTE"` all produce the same key.

use regex::Regex;
use std::sync::LazyLock;

/// Matches every character that is not an ASCII letter, digit or whitespace.
/// Applied after transliteration, so the input is already ASCII.
static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s]+").expect("valid regex"));

/// Normalizes free text into a comparison key.
///
/// The pipeline:
/// 1. Transliterate to ASCII (`"Conchalí"` → `"Conchali"`, `"Ñuble"` → `"Nuble"`)
/// 2. Uppercase
/// 3. Strip everything except letters, digits and whitespace
/// 4. Collapse whitespace
/// 5. Trim
///
/// Transliteration maps every code point to some (possibly empty) ASCII
/// string, so this function is total and never fails. Applying it twice
/// yields the same result as applying it once.
#[must_use]
pub fn normalize(text: &str) -> String {
    let ascii = unidecode::unidecode(text).to_ascii_uppercase();
    let stripped = NON_ALNUM_RE.replace_all(&ascii, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
