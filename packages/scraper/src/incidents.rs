//! Incident report CSV loader.
//!
//! Incident reports come from a published spreadsheet export. Only the
//! free-text address column is read; every data row yields exactly one
//! entry, `None` where the cell is blank or the row is short, so row
//! positions line up with the source file.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use crate::{ScrapeError, http};

/// Download timeout for datasets that do not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Reads the `column` cells of a CSV with a header row.
///
/// Header names are trimmed before lookup, so `" Direccion "` matches
/// `"Direccion"`. Cell values are trimmed too.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingColumn`] if no header matches `column`,
/// or [`ScrapeError::Csv`] if the CSV is malformed.
pub fn load_addresses_from_csv<R: Read>(
    reader: R,
    column: &str,
) -> Result<Vec<Option<String>>, ScrapeError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let wanted = column.trim();
    let index = headers
        .iter()
        .position(|h| h == wanted)
        .ok_or_else(|| ScrapeError::MissingColumn {
            column: wanted.to_owned(),
            available: headers.clone(),
        })?;

    let mut addresses = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cell = record
            .get(index)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        addresses.push(cell);
    }

    log::debug!("Read {} rows from column '{wanted}'", addresses.len());
    Ok(addresses)
}

/// Reads the `column` cells of a CSV file.
///
/// # Errors
///
/// Returns [`ScrapeError::Io`] if the file cannot be opened, otherwise the
/// errors of [`load_addresses_from_csv`].
pub fn read_addresses_csv(path: &Path, column: &str) -> Result<Vec<Option<String>>, ScrapeError> {
    let file = std::fs::File::open(path)?;
    load_addresses_from_csv(std::io::BufReader::new(file), column)
}

/// Downloads a CSV and reads its `column` cells.
///
/// Each attempt is bounded by `timeout`.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the download fails after retries, otherwise
/// the errors of [`load_addresses_from_csv`].
pub async fn fetch_addresses_csv(
    client: &reqwest::Client,
    url: &str,
    column: &str,
    timeout: Duration,
) -> Result<Vec<Option<String>>, ScrapeError> {
    log::info!("Downloading incident CSV from {url}");
    let body = http::send_text(|| client.get(url).timeout(timeout)).await?;
    log::debug!("Downloaded {} bytes from {url}", body.len());
    let addresses = load_addresses_from_csv(body.as_bytes(), column)?;
    log::info!("Loaded {} incident rows", addresses.len());
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMN: &str = "¿Dónde ocurre este problema?";

    #[test]
    fn reads_column_with_padded_header() {
        let csv = "Marca temporal, ¿Dónde ocurre este problema? ,Tipo\n\
                   2024-01-01,Tres Ote 5317,Luminaria\n\
                   2024-01-02,Zapadores1450,Basura\n";
        let rows = load_addresses_from_csv(csv.as_bytes(), COLUMN).unwrap();
        assert_eq!(
            rows,
            vec![
                Some("Tres Ote 5317".to_string()),
                Some("Zapadores1450".to_string())
            ]
        );
    }

    #[test]
    fn blank_and_missing_cells_keep_their_row() {
        let csv = "id,Direccion\n1,Dorsal 10\n2,   \n3\n4,\"Independencia 42\"\n";
        let rows = load_addresses_from_csv(csv.as_bytes(), "Direccion").unwrap();
        assert_eq!(
            rows,
            vec![
                Some("Dorsal 10".to_string()),
                None,
                None,
                Some("Independencia 42".to_string())
            ]
        );
    }

    #[test]
    fn quoted_cells_may_contain_commas() {
        let csv = "Direccion\n\"Dorsal 10, Conchalí\"\n";
        let rows = load_addresses_from_csv(csv.as_bytes(), "Direccion").unwrap();
        assert_eq!(rows, vec![Some("Dorsal 10, Conchalí".to_string())]);
    }

    #[test]
    fn missing_column_lists_available_headers() {
        let csv = "id, Calle \n1,Dorsal\n";
        let err = load_addresses_from_csv(csv.as_bytes(), "Direccion").unwrap_err();
        match err {
            ScrapeError::MissingColumn { column, available } => {
                assert_eq!(column, "Direccion");
                assert_eq!(available, vec!["id", "Calle"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let rows = load_addresses_from_csv("Direccion\n".as_bytes(), "Direccion").unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_download_times_out() {
        // Accepts connections through the backlog but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/incidents.csv", listener.local_addr().unwrap());

        let client = reqwest::Client::new();
        let err = fetch_addresses_csv(&client, &url, "Direccion", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::Http(_)));
        drop(listener);
    }
}
