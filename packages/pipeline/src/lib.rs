#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address correction and geocoding, one address at a time or in bulk.
//!
//! [`AddressService`] owns a street registry snapshot, a corrector and a
//! geocoding resolver, and exposes the three operations callers need:
//!
//! - [`AddressService::correct_address`]: street-name correction only.
//! - [`AddressService::resolve_address`]: geocoding of a corrected address.
//! - [`AddressService::resolve_bulk`] / [`AddressService::stream_bulk`]:
//!   correct-then-resolve over a column of raw addresses.
//!
//! Rows are processed strictly in order, one provider request in flight at
//! a time. No row can abort the batch: every failure becomes a row status.

pub mod bulk;
pub mod progress;

use std::sync::Arc;

use futures::{Stream, StreamExt as _};
use geo_gestion_address::{AddressCorrector, CorrectedAddress, StreetRegistry};
use geo_gestion_geocoder::{GeoResolver, Geocoder, Resolution};

pub use bulk::{BulkReport, BulkResultRow, BulkSummary, RowStatus};
pub use progress::{NullProgress, ProgressCallback};

/// Result of correcting and resolving a single address.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressLookup {
    /// The address as supplied.
    pub original: String,
    /// The corrected address.
    pub corrected: CorrectedAddress,
    /// The geocoding outcome for the corrected address.
    pub resolution: Resolution,
}

/// Correction and resolution over a fixed street registry snapshot.
pub struct AddressService<G> {
    registry: StreetRegistry,
    corrector: AddressCorrector,
    resolver: GeoResolver<G>,
}

impl<G: Geocoder> AddressService<G> {
    /// Creates a service. An empty `registry` disables correction.
    #[must_use]
    pub const fn new(
        registry: StreetRegistry,
        corrector: AddressCorrector,
        resolver: GeoResolver<G>,
    ) -> Self {
        Self {
            registry,
            corrector,
            resolver,
        }
    }

    /// The street registry snapshot.
    #[must_use]
    pub const fn registry(&self) -> &StreetRegistry {
        &self.registry
    }

    /// The correction policy.
    #[must_use]
    pub const fn corrector(&self) -> &AddressCorrector {
        &self.corrector
    }

    /// The geocoding resolver.
    #[must_use]
    pub const fn resolver(&self) -> &GeoResolver<G> {
        &self.resolver
    }

    /// Corrects the street name of `raw`.
    #[must_use]
    pub fn correct_address(&self, raw: &str) -> CorrectedAddress {
        self.corrector.correct(raw, &self.registry)
    }

    /// Geocodes an already-corrected address in the default locality.
    pub async fn resolve_address(&self, corrected: &str) -> Resolution {
        self.resolver.resolve(corrected).await
    }

    /// Corrects `raw`, then geocodes the result.
    pub async fn lookup(&self, raw: &str) -> AddressLookup {
        let corrected = self.correct_address(raw);
        let resolution = self.resolve_address(&corrected.text).await;
        AddressLookup {
            original: raw.to_string(),
            corrected,
            resolution,
        }
    }

    async fn process_row(&self, index: usize, raw: Option<&str>) -> BulkResultRow {
        let corrected = raw.map_or_else(
            || CorrectedAddress::unchanged(""),
            |raw| self.correct_address(raw),
        );
        let resolution = self.resolve_address(&corrected.text).await;

        match &resolution {
            Resolution::NotFound => {
                log::debug!("Row {index}: '{}' not found", corrected.text);
            }
            Resolution::Skipped => log::debug!("Row {index}: no address"),
            _ => {}
        }

        BulkResultRow::new(index, raw.map(String::from), corrected, resolution)
    }

    /// Yields one processed row per input row, in input order.
    ///
    /// Each row is fully corrected and resolved before the next one starts.
    /// Dropping the stream abandons the remaining rows; rows already
    /// yielded are unaffected.
    pub fn stream_bulk<'a, S>(
        &'a self,
        rows: &'a [Option<S>],
    ) -> impl Stream<Item = BulkResultRow> + 'a
    where
        S: AsRef<str> + Sync,
    {
        async_stream::stream! {
            for (index, raw) in rows.iter().enumerate() {
                yield self.process_row(index, raw.as_ref().map(AsRef::as_ref)).await;
            }
        }
    }

    /// Corrects and resolves every row, reporting progress per row.
    pub async fn resolve_bulk<S>(
        &self,
        rows: &[Option<S>],
        progress: Option<&Arc<dyn ProgressCallback>>,
    ) -> BulkReport
    where
        S: AsRef<str> + Sync,
    {
        log::info!("Resolving {} addresses...", rows.len());
        let progress = progress.map_or(&NullProgress as &dyn ProgressCallback, |p| p.as_ref());
        progress.started(rows.len());

        let mut results = Vec::with_capacity(rows.len());
        let mut summary = BulkSummary::default();
        let mut stream = std::pin::pin!(self.stream_bulk(rows));

        while let Some(row) = stream.next().await {
            summary.record(&row);
            progress.row_done(&row, &summary);
            results.push(row);
        }

        log::info!(
            "Resolved {} of {} attempted addresses ({} rows, {} corrected, {} unavailable)",
            summary.resolved,
            summary.attempted,
            summary.total,
            summary.corrected,
            summary.unavailable,
        );
        progress.finished(&summary);

        BulkReport {
            rows: results,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use geo_gestion_geocoder::{GeoCoordinate, GeocodeError, GeocodeHit, ResolverConfig};

    use super::*;

    /// Answers each query from a script keyed by street; unknown streets
    /// are "not found".
    struct ScriptedGeocoder {
        hits: BTreeMap<&'static str, (f64, f64)>,
        failures: Mutex<VecDeque<&'static str>>,
        calls: AtomicUsize,
    }

    impl ScriptedGeocoder {
        fn new(hits: &[(&'static str, (f64, f64))]) -> Arc<Self> {
            Arc::new(Self {
                hits: hits.iter().copied().collect(),
                failures: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn fail_next(&self, street: &'static str) {
            self.failures.lock().unwrap().push_back(street);
        }
    }

    impl Geocoder for ScriptedGeocoder {
        async fn geocode(
            &self,
            query: &str,
            _user_agent: &str,
        ) -> Result<Option<GeocodeHit>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let address = query.split(',').next().unwrap_or_default();
            {
                let mut failures = self.failures.lock().unwrap();
                if failures.front().is_some_and(|f| address.starts_with(f)) {
                    failures.pop_front();
                    return Err(GeocodeError::Unavailable {
                        message: "HTTP 503".to_string(),
                    });
                }
            }
            Ok(self
                .hits
                .iter()
                .find(|(street, _)| address.starts_with(*street))
                .map(|(_, (lat, lon))| GeocodeHit {
                    coordinate: GeoCoordinate {
                        latitude: *lat,
                        longitude: *lon,
                    },
                    display_name: None,
                    address: BTreeMap::new(),
                }))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        total: Mutex<Option<usize>>,
        rows: Mutex<Vec<(usize, RowStatus, usize)>>,
        finished: Mutex<Option<BulkSummary>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn started(&self, total: usize) {
            *self.total.lock().unwrap() = Some(total);
        }
        fn row_done(&self, row: &BulkResultRow, summary: &BulkSummary) {
            self.rows
                .lock()
                .unwrap()
                .push((row.index, row.status, summary.total));
        }
        fn finished(&self, summary: &BulkSummary) {
            *self.finished.lock().unwrap() = Some(*summary);
        }
    }

    fn service(geocoder: Arc<ScriptedGeocoder>) -> AddressService<Arc<ScriptedGeocoder>> {
        let registry =
            StreetRegistry::from_names(["Independencia", "Tres Oriente", "Dorsal", "Los Zapadores"]);
        let resolver = GeoResolver::new(
            geocoder,
            ResolverConfig {
                locality: "Conchalí".to_string(),
                region: "Región Metropolitana, Chile".to_string(),
                rate_limit: Duration::ZERO,
                ..ResolverConfig::default()
            },
        );
        AddressService::new(registry, AddressCorrector::default(), resolver)
    }

    #[tokio::test]
    async fn lookup_corrects_before_geocoding() {
        let geocoder = ScriptedGeocoder::new(&[("Tres Oriente", (-33.3858, -70.6712))]);
        let svc = service(geocoder.clone());

        let result = svc.lookup("Tres Ote. 5317").await;

        assert_eq!(result.corrected.text, "Tres Oriente 5317");
        assert!(result.corrected.was_corrected);
        assert!(result.resolution.is_found());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_input_makes_no_geocode_call() {
        let geocoder = ScriptedGeocoder::new(&[]);
        let svc = service(geocoder.clone());

        let result = svc.lookup("   ").await;

        assert_eq!(result.corrected.text, "");
        assert_eq!(result.resolution, Resolution::Skipped);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_row_not_found_does_not_stop_the_third() {
        let geocoder = ScriptedGeocoder::new(&[
            ("Tres Oriente", (-33.3858, -70.6712)),
            ("Independencia", (-33.3700, -70.6500)),
        ]);
        let svc = service(geocoder.clone());
        let rows = [
            Some("Tres Ote. 5317"),
            Some("Calle Inventada 123"),
            Some("Independencia 42"),
        ];

        let report = svc.resolve_bulk(&rows, None).await;

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.resolved_rows().count(), 2);
        assert!(report.rows[0].coordinate.is_some());
        assert!(report.rows[1].coordinate.is_none());
        assert_eq!(report.rows[1].status, RowStatus::NotFound);
        assert!(report.rows[2].coordinate.is_some());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn blank_rows_are_carried_not_attempted() {
        let geocoder = ScriptedGeocoder::new(&[("Dorsal", (1.0, 2.0))]);
        let svc = service(geocoder.clone());
        let rows = [None, Some("Dorsal 10".to_string()), Some("  ".to_string())];

        let report = svc.resolve_bulk(&rows, None).await;

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].status, RowStatus::EmptyInput);
        assert_eq!(report.rows[2].status, RowStatus::EmptyInput);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.attempted, 1);
        assert_eq!(report.summary.resolved, 1);
        assert_eq!(report.summary.unresolved, 2);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_row_is_distinguishable() {
        let geocoder = ScriptedGeocoder::new(&[("Dorsal", (1.0, 2.0))]);
        geocoder.fail_next("Dorsal");
        let svc = service(geocoder.clone());
        let rows = [Some("Dorsal 10"), Some("Dorsal 10")];

        let report = svc.resolve_bulk(&rows, None).await;

        assert_eq!(report.rows[0].status, RowStatus::Unavailable);
        assert_eq!(report.rows[0].detail.as_deref(), Some("Service unavailable: HTTP 503"));
        // Not cached, so the repeat row is retried and succeeds.
        assert_eq!(report.rows[1].status, RowStatus::Resolved);
        assert_eq!(report.summary.unavailable, 1);
    }

    #[tokio::test]
    async fn repeated_addresses_hit_the_cache() {
        let geocoder = ScriptedGeocoder::new(&[("Tres Oriente", (-33.3858, -70.6712))]);
        let svc = service(geocoder.clone());
        let rows = [Some("Tres Ote. 5317"), Some("tres oriente 5317"), Some("Tres Oriente 5317")];

        let report = svc.resolve_bulk(&rows, None).await;

        assert_eq!(report.summary.resolved, 3);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.rows[0].coordinate, report.rows[2].coordinate);
    }

    #[tokio::test]
    async fn reports_progress_per_row() {
        let geocoder = ScriptedGeocoder::new(&[]);
        let svc = service(geocoder);
        let progress = Arc::new(RecordingProgress::default());
        let callback: Arc<dyn ProgressCallback> = progress.clone();

        let report = svc
            .resolve_bulk(&[Some("a 1"), None, Some("b 2")], Some(&callback))
            .await;

        assert_eq!(*progress.total.lock().unwrap(), Some(3));
        assert_eq!(
            *progress.rows.lock().unwrap(),
            vec![
                (0, RowStatus::NotFound, 1),
                (1, RowStatus::EmptyInput, 2),
                (2, RowStatus::NotFound, 3),
            ]
        );
        assert_eq!(progress.finished.lock().unwrap().as_ref(), Some(&report.summary));
    }


    #[tokio::test]
    async fn dropping_the_stream_keeps_yielded_rows() {
        let geocoder = ScriptedGeocoder::new(&[("Dorsal", (1.0, 2.0))]);
        let svc = service(geocoder.clone());
        let rows = [Some("Dorsal 1"), Some("Dorsal 2"), Some("Dorsal 3")];

        let first: Vec<BulkResultRow> = svc.stream_bulk(&rows).take(1).collect().await;

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].index, 0);
        assert!(first[0].is_resolved());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }
}
