//! Address correction against the street registry.
//!
//! Only the street-name part of an address is ever rewritten. The house
//! number is carried through verbatim, and anything the matcher is not
//! confident about is left exactly as the user typed it.

use geo_gestion_address_models::{
    CorrectedAddress, DEFAULT_THRESHOLD, Scorer, recompose,
};

use crate::fuzzy::best_match;
use crate::registry::StreetRegistry;
use crate::split::split_address;

/// Corrects the street name of `raw` using the default scorer.
///
/// See [`AddressCorrector::correct`].
#[must_use]
pub fn correct_address(raw: &str, registry: &StreetRegistry, threshold: u8) -> CorrectedAddress {
    AddressCorrector::new(threshold).correct(raw, registry)
}

/// Street-name corrector with a fixed acceptance policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressCorrector {
    /// Minimum score (inclusive) for a match to be applied.
    pub threshold: u8,
    /// Similarity strategy.
    pub scorer: Scorer,
}

impl Default for AddressCorrector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl AddressCorrector {
    /// Creates a corrector with the given threshold and the default scorer.
    #[must_use]
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            scorer: Scorer::default(),
        }
    }

    /// Overrides the similarity strategy.
    #[must_use]
    pub const fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Corrects the street name of `raw` against `registry`.
    ///
    /// - Blank input is returned as an empty, uncorrected address.
    /// - Input with no street text (e.g. `"42"`) is returned trimmed and
    ///   unchanged without consulting the registry.
    /// - Otherwise the best registry match replaces the street text if its
    ///   score is at least `threshold`, and the house number is re-attached
    ///   after a single space.
    ///
    /// This is a pure function of its arguments.
    #[must_use]
    pub fn correct(&self, raw: &str, registry: &StreetRegistry) -> CorrectedAddress {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CorrectedAddress::unchanged("");
        }

        let split = split_address(trimmed);
        if split.street_text.is_empty() {
            return CorrectedAddress::unchanged(trimmed);
        }

        let accepted = best_match(&split.street_text, registry, self.scorer)
            .filter(|m| m.is_accepted(self.threshold));

        if let Some(m) = accepted {
            log::debug!(
                "Corrected street '{}' -> '{}' (score {})",
                split.street_text,
                m.candidate.canonical_name,
                m.score
            );
            return CorrectedAddress {
                text: recompose(&m.candidate.canonical_name, split.number.as_deref()),
                was_corrected: true,
            };
        }

        log::debug!("No registry match for street '{}'", split.street_text);
        CorrectedAddress::unchanged(split.recompose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StreetRegistry {
        StreetRegistry::from_names(["Independencia", "Tres Oriente", "Dorsal", "Los Zapadores"])
    }

    #[test]
    fn corrects_abbreviated_street_and_keeps_number() {
        let corrected = correct_address("Tres Ote. 5317", &registry(), 80);
        assert_eq!(corrected.text, "Tres Oriente 5317");
        assert!(corrected.was_corrected);
    }

    #[test]
    fn leaves_unknown_street_unchanged() {
        let corrected = correct_address("Calle Inventada 123", &registry(), 80);
        assert_eq!(corrected.text, "Calle Inventada 123");
        assert!(!corrected.was_corrected);
    }

    #[test]
    fn empty_input_returns_empty() {
        let corrected = correct_address("", &registry(), 80);
        assert_eq!(corrected.text, "");
        assert!(!corrected.was_corrected);
        assert_eq!(correct_address("   ", &registry(), 80).text, "");
    }

    #[test]
    fn numeric_only_input_is_returned_unchanged() {
        let corrected = correct_address(" 42 ", &registry(), 0);
        assert_eq!(corrected.text, "42");
        assert!(!corrected.was_corrected);
    }

    #[test]
    fn corrects_street_without_number() {
        assert_eq!(correct_address("dorsal", &registry(), 80).text, "Dorsal");
    }

    #[test]
    fn separates_glued_number_even_when_uncorrected() {
        let corrected = correct_address("Calle Inventada123", &registry(), 80);
        assert_eq!(corrected.text, "Calle Inventada 123");
        assert!(!corrected.was_corrected);
    }

    #[test]
    fn empty_registry_passes_through() {
        let empty = StreetRegistry::empty();
        for raw in ["Tres Ote. 5317", "  Dorsal 10 ", "Independencia"] {
            let corrected = correct_address(raw, &empty, 80);
            assert_eq!(corrected.text, raw.trim());
            assert!(!corrected.was_corrected);
        }
    }

    #[test]
    fn threshold_above_score_rejects_match() {
        let corrected = correct_address("Tres Ote. 5317", &registry(), 81);
        assert_eq!(corrected.text, "Tres Ote. 5317");
        assert!(!corrected.was_corrected);
    }

    #[test]
    fn token_set_scorer_accepts_extra_qualifier() {
        let corrector = AddressCorrector::new(90).with_scorer(Scorer::TokenSet);
        let corrected = corrector.correct("Avenida Independencia 3500", &registry());
        assert_eq!(corrected.text, "Independencia 3500");
        assert!(corrected.was_corrected);
    }

    #[test]
    fn is_deterministic() {
        let registry = registry();
        let first = correct_address("Los Zapadore 88", &registry, 80);
        let second = correct_address("Los Zapadore 88", &registry, 80);
        assert_eq!(first, second);
    }

    #[test]
    fn raising_threshold_never_turns_uncorrected_into_corrected() {
        let registry = registry();
        for raw in ["Tres Ote. 5317", "Los Zapadore 88", "Indep 12", "Calle Inventada 1"] {
            let mut seen_uncorrected = false;
            for threshold in 0..=100 {
                let corrected = correct_address(raw, &registry, threshold);
                if seen_uncorrected {
                    assert!(!corrected.was_corrected, "{raw:?} at {threshold}");
                }
                seen_uncorrected |= !corrected.was_corrected;
            }
        }
    }
}
