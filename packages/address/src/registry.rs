//! In-memory registry of canonical street names.
//!
//! The registry is populated once from an external source (see the
//! `geo_gestion_scraper` crate) and is read-only afterwards. Entry order is
//! the source order and doubles as the tie-break order for fuzzy matching,
//! so it is preserved exactly.

use geo_gestion_address_models::StreetEntry;

use crate::normalize::normalize;

/// An immutable, ordered collection of canonical street names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreetRegistry {
    entries: Vec<StreetEntry>,
}

impl StreetRegistry {
    /// Builds a registry from canonical street names, in iteration order.
    ///
    /// Each name is trimmed and its normalized key computed once. Blank
    /// names are skipped; duplicates are kept.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = names
            .into_iter()
            .filter_map(|name| {
                let canonical_name = name.as_ref().trim();
                if canonical_name.is_empty() {
                    return None;
                }
                Some(StreetEntry {
                    canonical_name: canonical_name.to_string(),
                    normalized_key: normalize(canonical_name),
                })
            })
            .collect();

        Self { entries }
    }

    /// An empty registry. Correcting against it is a pass-through.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All entries in source order.
    #[must_use]
    pub fn entries(&self) -> &[StreetEntry] {
        &self.entries
    }

    /// Iterates the canonical names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.canonical_name.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
