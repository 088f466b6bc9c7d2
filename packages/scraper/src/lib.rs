#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fetching of the data address correction runs on.
//!
//! - [`streets`] scrapes a municipality's official street names from an
//!   HTML listing and builds a [`geo_gestion_address::StreetRegistry`].
//! - [`incidents`] loads the free-text address column of an incident
//!   report CSV, from a URL, a file or any reader.
//!
//! Every HTTP request goes through [`http::send_text`], which retries
//! transient failures.

pub mod http;
pub mod incidents;
pub mod streets;

/// Errors that can occur while fetching or parsing source data.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// Status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Parsing the response body failed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV has no column with the requested header.
    #[error("Column '{column}' not found (available: {available:?})")]
    MissingColumn {
        /// Requested header.
        column: String,
        /// Headers present in the file, trimmed.
        available: Vec<String>,
    },
}
