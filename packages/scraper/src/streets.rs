//! Official street list scraper.
//!
//! The street listing is an HTML page with one link per street (on
//! `codigo-postal.co`, `<ul class="cities"><li><a>Name</a></li>...`). The
//! trimmed text of every element matching the configured CSS selector is a
//! street name.

use std::time::Duration;

use geo_gestion_address::StreetRegistry;
use scraper::{Html, Selector};

use crate::{ScrapeError, http};

/// Default selector for `codigo-postal.co` street listings.
pub const DEFAULT_SELECTOR: &str = "ul.cities li a";

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::Parse(format!("invalid CSS selector '{selector}': {e}")))
}

/// Extracts street names from a listing page, in document order.
///
/// Elements whose text is blank after trimming are skipped.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if the selector is invalid or matches no
/// element with text.
pub fn parse_street_names(html: &str, selector: &str) -> Result<Vec<String>, ScrapeError> {
    let sel = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let names: Vec<String> = document
        .select(&sel)
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() {
        return Err(ScrapeError::Parse(format!(
            "no street names matching '{selector}' found in response"
        )));
    }

    Ok(names)
}

/// Downloads a listing page and extracts its street names.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the download fails after retries or the page
/// holds no street names.
pub async fn fetch_street_names(
    client: &reqwest::Client,
    url: &str,
    selector: &str,
    timeout: Duration,
) -> Result<Vec<String>, ScrapeError> {
    log::info!("Fetching street list from {url}");
    let html = http::send_text(|| client.get(url).timeout(timeout)).await?;
    log::debug!("Downloaded {} bytes from {url}", html.len());
    let names = parse_street_names(&html, selector)?;
    log::info!("Loaded {} street names", names.len());
    Ok(names)
}

/// Builds the street registry, degrading to an empty registry when the
/// listing cannot be fetched.
///
/// An empty registry disables correction; addresses then pass through
/// unchanged. Callers that must not run uncorrected should use
/// [`fetch_street_names`] and treat its error as fatal.
pub async fn load_registry(
    client: &reqwest::Client,
    url: &str,
    selector: &str,
    timeout: Duration,
) -> StreetRegistry {
    match fetch_street_names(client, url, selector, timeout).await {
        Ok(names) => StreetRegistry::from_names(names),
        Err(e) => {
            log::error!("Street registry unavailable, correction disabled: {e}");
            StreetRegistry::empty()
        }
    }
}
