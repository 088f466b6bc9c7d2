//! Command implementations shared by the subcommands and the interactive
//! menu.

use std::path::{Path, PathBuf};

use geo_gestion_address::fuzzy::rank_matches;
use geo_gestion_address::split_address;
use geo_gestion_cli_utils::{IndicatifProgress, MultiProgress};
use geo_gestion_municipality::DatasetConfig;
use geo_gestion_pipeline::BulkReport;
use geo_gestion_scraper::incidents;

use crate::context::Context;
use crate::output;

/// Where bulk input comes from and where results go.
#[derive(Debug, Clone, Default)]
pub struct BulkOptions {
    /// Local CSV file; takes precedence over `url`.
    pub csv: Option<PathBuf>,
    /// CSV download URL; defaults to the profile's dataset.
    pub url: Option<String>,
    /// Address column header; defaults to the profile's dataset column.
    pub column: Option<String>,
    /// Write all rows to this CSV file.
    pub output: Option<PathBuf>,
    /// Process only the first N rows.
    pub limit: Option<usize>,
}

/// Prints the corrected form of `address`, or notes that it was kept.
pub fn correct(ctx: &Context, address: &str) {
    let corrected = ctx.service.correct_address(address);
    if corrected.was_corrected {
        println!("{}  (corrected from \"{}\")", corrected.text, address.trim());
    } else {
        println!("{}  (unchanged)", corrected.text);
    }
}

/// Corrects `address`, geocodes it and prints both steps.
pub async fn resolve(ctx: &Context, address: &str) {
    let lookup = ctx.service.lookup(address).await;
    output::print_lookup(&lookup);
}

/// Prints the `limit` closest registry streets for the street part of
/// `address`. Candidates at or above the correction threshold are starred.
pub fn show_matches(ctx: &Context, address: &str, limit: usize) {
    let registry = ctx.service.registry();
    if registry.is_empty() {
        println!("Street registry is empty; nothing to match against.");
        return;
    }

    let corrector = ctx.service.corrector();
    let split = split_address(address);
    println!("Street text: \"{}\"", split.street_text);

    for m in rank_matches(&split.street_text, registry, corrector.scorer, limit) {
        let accepted = if m.is_accepted(corrector.threshold) {
            "*"
        } else {
            " "
        };
        println!("  {accepted} {:>3}  {}", m.score, m.candidate.canonical_name);
    }
}

/// Prints the street registry in source order.
pub fn list_streets(ctx: &Context) {
    let registry = ctx.service.registry();
    for name in registry.names() {
        println!("{name}");
    }
    println!();
    println!("{} streets in {}", registry.len(), ctx.profile.name);
}

async fn load_rows(
    ctx: &Context,
    opts: &BulkOptions,
) -> Result<Vec<Option<String>>, Box<dyn std::error::Error>> {
    let dataset = ctx.profile.dataset.as_ref();
    let column = opts
        .column
        .clone()
        .or_else(|| dataset.map(|d| d.address_column.clone()))
        .ok_or("No address column: pass --column or use a profile with a [dataset] section")?;

    if let Some(path) = &opts.csv {
        log::info!("Reading addresses from {}", path.display());
        return Ok(incidents::read_addresses_csv(path, &column)?);
    }

    let url = opts
        .url
        .as_deref()
        .or_else(|| dataset.map(|d| d.url.as_str()))
        .ok_or("No dataset: pass --csv or --url, or use a profile with a [dataset] section")?;

    let timeout = dataset.map_or(incidents::DEFAULT_TIMEOUT, DatasetConfig::timeout);

    Ok(incidents::fetch_addresses_csv(&ctx.client, url, &column, timeout).await?)
}

fn write_output(path: &Path, report: &BulkReport) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    output::write_report_csv(std::io::BufWriter::new(file), report)?;
    log::info!("Wrote {} rows to {}", report.rows.len(), path.display());
    Ok(())
}

/// Corrects and geocodes a whole dataset.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or the output file
/// cannot be written. Row-level failures are reported, not returned.
pub async fn bulk(
    ctx: &Context,
    multi: &MultiProgress,
    opts: &BulkOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rows = load_rows(ctx, opts).await?;
    if let Some(limit) = opts.limit {
        rows.truncate(limit);
    }

    let progress = IndicatifProgress::rows_bar(multi, "Geocoding addresses");
    let report = ctx.service.resolve_bulk(&rows, Some(&progress)).await;

    output::print_report(&report);

    if let Some(path) = &opts.output {
        write_output(path, &report)?;
    }

    Ok(())
}
