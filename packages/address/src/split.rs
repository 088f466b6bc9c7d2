//! Splitting a raw address into street text and house number.
//!
//! Addresses in the municipality are written street-first with the house
//! number at the end (`"Tres Oriente 5317"`). The trailing run of digits is
//! the only part that is treated as a number; digits inside the street name
//! (`"Calle 10 de Julio"`) are left alone.

use geo_gestion_address_models::SplitAddress;
use regex::Regex;
use std::sync::LazyLock;

/// Shortest possible prefix followed by optional whitespace and a trailing
/// digit run. `.` does not cross newlines, so multi-line input is not split.
static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(\s*\d+)$").expect("valid regex"));

/// Splits `raw` into its street text and trailing house number.
///
/// The input is trimmed first. When there is no trailing digit run the
/// whole trimmed input becomes the street text. Purely numeric input yields
/// an empty street text.
#[must_use]
pub fn split_address(raw: &str) -> SplitAddress {
    let trimmed = raw.trim();

    let Some(caps) = TRAILING_NUMBER_RE.captures(trimmed) else {
        return SplitAddress {
            street_text: trimmed.to_string(),
            number: None,
        };
    };

    let street_text = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
    let number = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| !n.is_empty());

    SplitAddress {
        street_text,
        number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(raw: &str) -> (String, Option<String>) {
        let s = split_address(raw);
        (s.street_text, s.number)
    }

    #[test]
    fn splits_trailing_number() {
        assert_eq!(
            split("Tres Ote. 5317"),
            ("Tres Ote.".to_string(), Some("5317".to_string()))
        );
    }

    #[test]
    fn splits_number_without_separator() {
        assert_eq!(
            split("Zapadores1450"),
            ("Zapadores".to_string(), Some("1450".to_string()))
        );
    }

    #[test]
    fn keeps_address_without_number() {
        assert_eq!(split("  Avenida Independencia "), ("Avenida Independencia".to_string(), None));
    }

    #[test]
    fn leaves_inner_digits_in_street_text() {
        assert_eq!(split("Calle 10 de Julio"), ("Calle 10 de Julio".to_string(), None));
        assert_eq!(
            split("Calle 10 de Julio 221"),
            ("Calle 10 de Julio".to_string(), Some("221".to_string()))
        );
    }

    #[test]
    fn only_last_digit_run_is_the_number() {
        assert_eq!(
            split("Pasaje 12 34"),
            ("Pasaje 12".to_string(), Some("34".to_string()))
        );
    }

    #[test]
    fn numeric_only_has_empty_street() {
        assert_eq!(split("42"), (String::new(), Some("42".to_string())));
    }

    #[test]
    fn empty_input() {
        assert_eq!(split(""), (String::new(), None));
        assert_eq!(split("   "), (String::new(), None));
    }

    #[test]
    fn trailing_punctuation_prevents_split() {
        assert_eq!(split("Dorsal 12."), ("Dorsal 12.".to_string(), None));
    }

    #[test]
    fn recomposes_to_trimmed_original_modulo_whitespace() {
        for raw in [
            "Tres Ote. 5317",
            "  Dorsal   44 ",
            "Independencia",
            "Pasaje 12 34",
            "42",
            "Zapadores1450",
        ] {
            let s = split_address(raw);
            let rebuilt = s.recompose();
            let squash = |x: &str| x.split_whitespace().collect::<String>();
            assert_eq!(squash(&rebuilt), squash(raw.trim()), "split of {raw:?}");
        }
    }
}
