//! Nominatim / `OpenStreetMap` geocoder client.
//!
//! Nominatim has strict usage rules: **1 request per second** maximum on
//! the public instance, and every client must identify itself with a
//! `User-Agent`. Pacing is handled by the resolver's throttle; this module
//! only issues single free-form searches.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::collections::BTreeMap;
use std::time::Duration;

use crate::{GeoCoordinate, GeocodeError, GeocodeHit, Geocoder};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Free-form Nominatim search client.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_codes: Option<String>,
    timeout: Duration,
}

impl NominatimGeocoder {
    /// Creates a client for the search endpoint at `base_url`
    /// (e.g. `"https://nominatim.openstreetmap.org/search"`).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
            country_codes: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Restricts results to the given comma-separated ISO country codes.
    #[must_use]
    pub fn with_country_codes(mut self, codes: &str) -> Self {
        let codes = codes.trim();
        self.country_codes = (!codes.is_empty()).then(|| codes.to_owned());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The search endpoint this client queries.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(
        &self,
        query: &str,
        user_agent: &str,
    ) -> Result<Option<GeocodeHit>, GeocodeError> {
        let mut params = vec![
            ("q", query),
            ("format", "jsonv2"),
            ("limit", "1"),
            ("addressdetails", "1"),
        ];
        if let Some(codes) = self.country_codes.as_deref() {
            params.push(("countrycodes", codes));
        }

        let resp = self
            .client
            .get(&self.base_url)
            .query(&params)
            .header(reqwest::header::USER_AGENT, user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if status.is_server_error() {
            return Err(GeocodeError::Unavailable {
                message: format!("HTTP {status}"),
            });
        }
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

/// Parses a Nominatim `jsonv2` search response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodeHit>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let display_name = first["display_name"].as_str().map(String::from);

    let address: BTreeMap<String, String> = first["address"]
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok(Some(GeocodeHit {
        coordinate: GeoCoordinate {
            latitude: lat,
            longitude: lon,
        },
        display_name,
        address,
    }))
}
