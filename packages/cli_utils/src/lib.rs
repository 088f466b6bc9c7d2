#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the geo gestion tools.
//!
//! Provides an `indicatif` progress bar behind the [`ProgressCallback`]
//! trait, [`init_logger`] which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while progress bars redraw, and
//! small `dialoguer` prompt helpers.

use std::sync::Arc;
use std::time::Duration;

use dialoguer::Input;
use geo_gestion_pipeline::{BulkResultRow, BulkSummary, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Bulk-run progress drawn as an `indicatif` bar: a spinner until the row
/// count is known, then a bar with the running resolved count.
pub struct IndicatifProgress {
    bar: ProgressBar,
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Adds a bulk-run bar labelled `message` to `multi`.
    #[must_use]
    pub fn rows_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        Arc::new(Self::with_bar(bar, message))
    }

    fn with_bar(bar: ProgressBar, message: &str) -> Self {
        bar.set_style(
            ProgressStyle::with_template("{spinner:.yellow} {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {prefix} {wide_bar:.yellow/dim} {pos}/{len} rows, {msg} [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Self { bar, bar_style }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn row_done(&self, _row: &BulkResultRow, summary: &BulkSummary) {
        self.bar.inc(1);
        self.bar.set_message(format!(
            "{} resolved, {} unavailable",
            summary.resolved, summary.unavailable
        ));
    }

    fn finished(&self, summary: &BulkSummary) {
        self.bar.finish_with_message(format!(
            "{} of {} resolved",
            summary.resolved, summary.attempted
        ));
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}

/// Prompts for free text. Returns `None` if the user enters nothing.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn prompt_optional_text(prompt: &str) -> Result<Option<String>, dialoguer::Error> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}

/// Prompts for a non-negative integer. Returns `None` if the user enters
/// nothing.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or the input is not a
/// number.
pub fn prompt_optional_usize(prompt: &str) -> Result<Option<usize>, Box<dyn std::error::Error>> {
    match prompt_optional_text(prompt)? {
        Some(text) => Ok(Some(text.parse()?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use geo_gestion_address_models::CorrectedAddress;
    use geo_gestion_geocoder::{GeoCoordinate, Resolution};

    use super::*;

    #[test]
    fn bar_tracks_rows_and_resolved_count() {
        let bar = ProgressBar::hidden();
        let progress = IndicatifProgress::with_bar(bar.clone(), "Geocoding addresses");

        progress.started(2);
        assert_eq!(bar.length(), Some(2));

        let row = BulkResultRow::new(
            0,
            Some("Dorsal 10".to_string()),
            CorrectedAddress::unchanged("Dorsal 10"),
            Resolution::Found(GeoCoordinate {
                latitude: -33.38,
                longitude: -70.67,
            }),
        );
        let mut summary = BulkSummary::default();
        summary.record(&row);
        progress.row_done(&row, &summary);

        assert_eq!(bar.position(), 1);
        assert_eq!(bar.message(), "1 resolved, 0 unavailable");

        progress.finished(&summary);
        assert!(bar.is_finished());
        assert_eq!(bar.message(), "1 of 1 resolved");
    }
}
