//! Terminal and CSV rendering of results.

use std::io::Write;

use geo_gestion_geocoder::{GeoCoordinate, Resolution};
use geo_gestion_pipeline::{AddressLookup, BulkReport};

/// Formats a coordinate as `"lat, lon"` with 5 decimals (about 1 m).
#[must_use]
pub fn format_coordinate(c: GeoCoordinate) -> String {
    format!("{:.5}, {:.5}", c.latitude, c.longitude)
}

/// One-line description of a resolution.
#[must_use]
pub fn describe_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Found(c) => format_coordinate(*c),
        Resolution::NotFound => "not found".to_string(),
        Resolution::Unavailable(msg) => format!("geocoder unavailable, try again later ({msg})"),
        Resolution::Failed(msg) => format!("geocoding failed ({msg})"),
        Resolution::Skipped => "no address given".to_string(),
    }
}

/// Prints the original, corrected and geocoded forms of one address.
pub fn print_lookup(lookup: &AddressLookup) {
    println!("Original:    {}", lookup.original.trim());
    println!(
        "Corrected:   {}{}",
        lookup.corrected.text,
        if lookup.corrected.was_corrected {
            ""
        } else {
            " (unchanged)"
        }
    );
    println!("Coordinates: {}", describe_resolution(&lookup.resolution));
}

/// Prints the run summary and lists the attempted rows left unresolved.
pub fn print_report(report: &BulkReport) {
    let s = &report.summary;
    println!();
    println!(
        "Resolved {} of {} addresses ({:.1}%)",
        s.resolved,
        s.attempted,
        s.success_rate() * 100.0
    );
    println!(
        "{} rows, {} corrected, {} blank, {} unavailable",
        s.total,
        s.corrected,
        s.total - s.attempted,
        s.unavailable
    );
    if let Some(center) = report.centroid() {
        println!("Center:   {}", format_coordinate(center));
    }

    let unresolved: Vec<_> = report
        .unresolved_rows()
        .filter(|r| r.was_attempted())
        .collect();
    if !unresolved.is_empty() {
        println!();
        println!("Unresolved:");
        for row in unresolved {
            println!(
                "  {:>5}  {:<12} {}",
                row.index + 1,
                row.status.as_ref(),
                row.original.as_deref().unwrap_or_default().trim()
            );
        }
    }
}

/// Writes every row of `report` as CSV.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn write_report_csv<W: Write>(writer: W, report: &BulkReport) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "row",
        "original",
        "corrected",
        "was_corrected",
        "status",
        "latitude",
        "longitude",
        "detail",
    ])?;

    for row in &report.rows {
        let (lat, lon) = row.coordinate.map_or_else(
            || (String::new(), String::new()),
            |c| (c.latitude.to_string(), c.longitude.to_string()),
        );
        wtr.write_record([
            (row.index + 1).to_string().as_str(),
            row.original.as_deref().unwrap_or_default(),
            row.corrected.text.as_str(),
            if row.corrected.was_corrected {
                "true"
            } else {
                "false"
            },
            row.status.as_ref(),
            lat.as_str(),
            lon.as_str(),
            row.detail.as_deref().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
