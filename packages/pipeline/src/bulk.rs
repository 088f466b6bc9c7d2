//! Bulk result rows and their aggregate summary.
//!
//! Every input row produces exactly one [`BulkResultRow`], in input order.
//! Blank rows are carried through as [`RowStatus::EmptyInput`] rather than
//! dropped, so the report always has as many rows as the input.

use geo_gestion_address::CorrectedAddress;
use geo_gestion_geocoder::{GeoCoordinate, Resolution};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Outcome of one bulk row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RowStatus {
    /// A coordinate was found.
    Resolved,
    /// The provider found nothing.
    NotFound,
    /// The provider was temporarily unreachable.
    Unavailable,
    /// The provider failed unexpectedly.
    Failed,
    /// The row had no address; nothing was attempted.
    EmptyInput,
}

/// One processed input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResultRow {
    /// Zero-based position in the input.
    pub index: usize,
    /// The address as supplied, `None` if the cell was missing.
    pub original: Option<String>,
    /// The corrected address (empty for blank rows).
    pub corrected: CorrectedAddress,
    /// Row outcome.
    pub status: RowStatus,
    /// Where the address was located, if it was.
    pub coordinate: Option<GeoCoordinate>,
    /// Provider error message for unavailable or failed rows.
    pub detail: Option<String>,
}

impl BulkResultRow {
    /// Builds a row from a correction and its resolution.
    #[must_use]
    pub fn new(
        index: usize,
        original: Option<String>,
        corrected: CorrectedAddress,
        resolution: Resolution,
    ) -> Self {
        let coordinate = resolution.coordinate();
        let (status, detail) = match resolution {
            Resolution::Found(_) => (RowStatus::Resolved, None),
            Resolution::NotFound => (RowStatus::NotFound, None),
            Resolution::Unavailable(msg) => (RowStatus::Unavailable, Some(msg)),
            Resolution::Failed(msg) => (RowStatus::Failed, Some(msg)),
            Resolution::Skipped => (RowStatus::EmptyInput, None),
        };
        Self {
            index,
            original,
            corrected,
            status,
            coordinate,
            detail,
        }
    }

    /// Returns `true` if the row carries a coordinate.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.coordinate.is_some()
    }

    /// Returns `true` if a lookup was made for this row.
    #[must_use]
    pub fn was_attempted(&self) -> bool {
        self.status != RowStatus::EmptyInput
    }

    /// Returns `true` if correction changed the trimmed original text.
    #[must_use]
    pub fn was_changed(&self) -> bool {
        self.original
            .as_deref()
            .is_some_and(|o| o.trim() != self.corrected.text)
    }
}

/// Aggregate counts over a bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    /// Input rows.
    pub total: usize,
    /// Rows with a non-blank address (a lookup was made).
    pub attempted: usize,
    /// Rows with a coordinate.
    pub resolved: usize,
    /// Rows whose text correction changed.
    pub corrected: usize,
    /// Rows without a coordinate, blank rows included.
    pub unresolved: usize,
    /// Unresolved rows that may succeed if retried later.
    pub unavailable: usize,
}

impl BulkSummary {
    /// Counts one more row.
    pub fn record(&mut self, row: &BulkResultRow) {
        self.total += 1;
        if row.was_attempted() {
            self.attempted += 1;
        }
        if row.is_resolved() {
            self.resolved += 1;
        } else {
            self.unresolved += 1;
        }
        if row.was_changed() {
            self.corrected += 1;
        }
        if row.status == RowStatus::Unavailable {
            self.unavailable += 1;
        }
    }

    /// Summarizes a set of rows.
    #[must_use]
    pub fn from_rows(rows: &[BulkResultRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            summary.record(row);
        }
        summary
    }

    /// Fraction of attempted rows that resolved, `0.0` if none were
    /// attempted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.resolved as f64 / self.attempted as f64
        }
    }
}

/// All rows of a bulk run plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkReport {
    /// One row per input, in input order.
    pub rows: Vec<BulkResultRow>,
    /// Aggregate counts.
    pub summary: BulkSummary,
}

impl BulkReport {
    /// Builds a report, computing the summary.
    #[must_use]
    pub fn new(rows: Vec<BulkResultRow>) -> Self {
        let summary = BulkSummary::from_rows(&rows);
        Self { rows, summary }
    }

    /// Rows that carry a coordinate.
    pub fn resolved_rows(&self) -> impl Iterator<Item = &BulkResultRow> {
        self.rows.iter().filter(|r| r.is_resolved())
    }

    /// Rows without a coordinate.
    pub fn unresolved_rows(&self) -> impl Iterator<Item = &BulkResultRow> {
        self.rows.iter().filter(|r| !r.is_resolved())
    }

    /// Mean of the resolved coordinates, a reasonable map center.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<GeoCoordinate> {
        let (n, lat, lon) = self
            .resolved_rows()
            .filter_map(|r| r.coordinate)
            .fold((0usize, 0.0, 0.0), |(n, lat, lon), c| {
                (n + 1, lat + c.latitude, lon + c.longitude)
            });
        (n > 0).then(|| GeoCoordinate {
            latitude: lat / n as f64,
            longitude: lon / n as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, original: Option<&str>, corrected: &str, res: Resolution) -> BulkResultRow {
        BulkResultRow::new(
            index,
            original.map(String::from),
            CorrectedAddress {
                text: corrected.to_string(),
                was_corrected: original.is_some_and(|o| o.trim() != corrected),
            },
            res,
        )
    }

    fn at(lat: f64, lon: f64) -> Resolution {
        Resolution::Found(GeoCoordinate {
            latitude: lat,
            longitude: lon,
        })
    }

    #[test]
    fn maps_resolution_to_status() {
        assert_eq!(row(0, Some("a"), "a", at(1.0, 1.0)).status, RowStatus::Resolved);
        assert_eq!(row(0, Some("a"), "a", Resolution::NotFound).status, RowStatus::NotFound);
        let down = row(0, Some("a"), "a", Resolution::Unavailable("HTTP 503".to_string()));
        assert_eq!(down.status, RowStatus::Unavailable);
        assert_eq!(down.detail.as_deref(), Some("HTTP 503"));
        assert_eq!(row(0, None, "", Resolution::Skipped).status, RowStatus::EmptyInput);
    }

    #[test]
    fn summary_counts() {
        let report = BulkReport::new(vec![
            row(0, Some("Tres Ote. 5317"), "Tres Oriente 5317", at(-33.38, -70.67)),
            row(1, Some("Calle Inventada 1"), "Calle Inventada 1", Resolution::NotFound),
            row(2, None, "", Resolution::Skipped),
            row(3, Some("Dorsal 10"), "Dorsal 10", Resolution::Unavailable(String::new())),
            row(4, Some(" Dorsal 20 "), "Dorsal 20", at(-33.36, -70.65)),
        ]);
        assert_eq!(
            report.summary,
            BulkSummary {
                total: 5,
                attempted: 4,
                resolved: 2,
                corrected: 1,
                unresolved: 3,
                unavailable: 1,
            }
        );
        assert!((report.summary.success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn resolved_and_unresolved_partition_rows() {
        let report = BulkReport::new(vec![
            row(0, Some("a 1"), "a 1", at(1.0, 1.0)),
            row(1, Some("b 2"), "b 2", Resolution::Failed("boom".to_string())),
            row(2, None, "", Resolution::Skipped),
        ]);
        let mut indices: Vec<usize> = report
            .resolved_rows()
            .chain(report.unresolved_rows())
            .map(|r| r.index)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(report.resolved_rows().count(), 1);
    }

    #[test]
    fn success_rate_of_nothing_attempted_is_zero() {
        let report = BulkReport::new(vec![row(0, Some("  "), "", Resolution::Skipped)]);
        assert_eq!(report.summary.attempted, 0);
        assert!(report.summary.success_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn centroid_averages_resolved_rows() {
        let report = BulkReport::new(vec![
            row(0, Some("a"), "a", at(-33.0, -70.0)),
            row(1, Some("b"), "b", Resolution::NotFound),
            row(2, Some("c"), "c", at(-34.0, -71.0)),
        ]);
        let c = report.centroid().unwrap();
        assert!((c.latitude - -33.5).abs() < 1e-9);
        assert!((c.longitude - -70.5).abs() < 1e-9);
        assert!(BulkReport::new(Vec::new()).centroid().is_none());
    }
}
