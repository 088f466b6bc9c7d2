#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipality profiles.
//!
//! A profile says where a municipality's official street list lives, how
//! strictly free-text addresses are corrected against it, and how corrected
//! addresses are geocoded. Profiles are TOML files under `profiles/`,
//! embedded at compile time and exposed via [`all_profiles`] and
//! [`profile`]. A user-supplied file can be loaded with [`from_path`].

use std::path::Path;
use std::time::Duration;

use geo_gestion_address_models::{DEFAULT_THRESHOLD, MAX_SCORE, Scorer};
use geo_gestion_geocoder::LocalePolicy;
use geo_gestion_geocoder::ResolverConfig;
use geo_gestion_geocoder::nominatim::NominatimGeocoder;
use serde::Deserialize;
use thiserror::Error;

/// Id of the profile used when none is given.
pub const DEFAULT_PROFILE: &str = "conchali";

/// Errors loading a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile is not valid TOML or is missing fields.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No embedded profile has this id.
    #[error("Unknown profile '{id}' (available: {available})")]
    UnknownProfile {
        /// Requested id.
        id: String,
        /// Comma-separated ids of the embedded profiles.
        available: String,
    },

    /// The profile parsed but holds an out-of-range value.
    #[error("Invalid profile '{id}': {message}")]
    Invalid {
        /// Profile id.
        id: String,
        /// What is wrong.
        message: String,
    },
}

/// A municipality's configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MunicipalityProfile {
    /// Unique identifier (e.g., `"conchali"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Locality qualifier used in geocoding queries and locale checks.
    pub locality: String,
    /// Region/country qualifier appended after the locality.
    pub region: String,
    /// Where the official street list comes from.
    pub streets: StreetsConfig,
    /// Correction policy.
    #[serde(default)]
    pub correction: CorrectionConfig,
    /// Geocoding provider and resolution policy.
    pub geocoder: GeocoderConfig,
    /// Default bulk dataset, if the municipality has one.
    #[serde(default)]
    pub dataset: Option<DatasetConfig>,
}

/// Street registry source: an HTML page listing the official street names.
#[derive(Debug, Clone, Deserialize)]
pub struct StreetsConfig {
    /// Page URL.
    pub url: String,
    /// CSS selector matching one element per street name.
    #[serde(default = "default_selector")]
    pub selector: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StreetsConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Correction policy.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CorrectionConfig {
    /// Minimum score (0-100) for a candidate street to replace the input.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Similarity scorer.
    #[serde(default)]
    pub scorer: Scorer,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            scorer: Scorer::default(),
        }
    }
}

/// Geocoding provider configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeocoderConfig {
    /// Nominatim / `OpenStreetMap` geocoder.
    Nominatim {
        /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
        base_url: String,
        /// Comma-separated ISO country codes to restrict results to.
        #[serde(default)]
        country_codes: String,
        /// Per-request timeout in seconds.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        /// Minimum delay between requests in milliseconds.
        #[serde(default = "default_rate_limit_ms")]
        rate_limit_ms: u64,
        /// Prefix of the per-request `User-Agent`.
        user_agent_prefix: String,
        /// Extra attempts after a transient failure.
        #[serde(default)]
        max_retries: u32,
        /// Delay before the first retry in milliseconds.
        #[serde(default = "default_retry_backoff_ms")]
        retry_backoff_ms: u64,
        /// How long results are cached, in seconds.
        #[serde(default = "default_cache_ttl_secs")]
        cache_ttl_secs: u64,
        /// Whether "not found" outcomes are cached too.
        #[serde(default = "default_true")]
        cache_misses: bool,
        /// Whether matches must lie in the profile's locality.
        #[serde(default)]
        locale_policy: LocalePolicy,
    },
}

/// Default bulk dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// CSV download URL.
    pub url: String,
    /// Header of the free-text address column.
    pub address_column: String,
    /// Download timeout in seconds.
    #[serde(default = "default_dataset_timeout_secs")]
    pub timeout_secs: u64,
}

impl DatasetConfig {
    /// Download timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_selector() -> String {
    "ul.cities li a".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_dataset_timeout_secs() -> u64 {
    60
}

const fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

const fn default_rate_limit_ms() -> u64 {
    1000
}

const fn default_retry_backoff_ms() -> u64 {
    2000
}

const fn default_cache_ttl_secs() -> u64 {
    3600
}

const fn default_true() -> bool {
    true
}

impl GeocoderConfig {
    /// Returns the provider's base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match self {
            Self::Nominatim { base_url, .. } => base_url,
        }
    }

    /// Builds the provider client.
    #[must_use]
    pub fn build_geocoder(&self, client: reqwest::Client) -> NominatimGeocoder {
        match self {
            Self::Nominatim {
                base_url,
                country_codes,
                timeout_secs,
                ..
            } => NominatimGeocoder::new(client, base_url)
                .with_country_codes(country_codes)
                .with_timeout(Duration::from_secs(*timeout_secs)),
        }
    }
}

impl MunicipalityProfile {
    /// Resolution policy for this municipality.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        let GeocoderConfig::Nominatim {
            rate_limit_ms,
            user_agent_prefix,
            max_retries,
            retry_backoff_ms,
            cache_ttl_secs,
            cache_misses,
            locale_policy,
            ..
        } = &self.geocoder;

        ResolverConfig {
            locality: self.locality.clone(),
            region: self.region.clone(),
            locale_policy: *locale_policy,
            cache_misses: *cache_misses,
            cache_ttl: Duration::from_secs(*cache_ttl_secs),
            rate_limit: Duration::from_millis(*rate_limit_ms),
            max_retries: *max_retries,
            retry_backoff: Duration::from_millis(*retry_backoff_ms),
            user_agent_prefix: user_agent_prefix.clone(),
        }
    }

    fn validate(self) -> Result<Self, ProfileError> {
        if self.correction.threshold > MAX_SCORE {
            return Err(ProfileError::Invalid {
                id: self.id,
                message: format!(
                    "correction threshold {} exceeds {MAX_SCORE}",
                    self.correction.threshold
                ),
            });
        }
        Ok(self)
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const PROFILE_TOMLS: &[(&str, &str)] = &[("conchali", include_str!("../profiles/conchali.toml"))];

#[cfg(test)]
const EXPECTED_PROFILE_COUNT: usize = 1;

/// Parses a profile from TOML text.
///
/// # Errors
///
/// Returns [`ProfileError::Toml`] if the text is not a valid profile, or
/// [`ProfileError::Invalid`] if a value is out of range.
pub fn from_toml_str(text: &str) -> Result<MunicipalityProfile, ProfileError> {
    let profile: MunicipalityProfile = toml::de::from_str(text)?;
    profile.validate()
}

/// Loads a profile from a TOML file.
///
/// # Errors
///
/// Returns [`ProfileError::Io`] if the file cannot be read, otherwise the
/// errors of [`from_toml_str`].
pub fn from_path(path: &Path) -> Result<MunicipalityProfile, ProfileError> {
    log::debug!("Loading municipality profile from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    from_toml_str(&text)
}

/// Returns all embedded profiles.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_profiles() -> Vec<MunicipalityProfile> {
    PROFILE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            from_toml_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse municipality profile '{name}': {e}"))
        })
        .collect()
}

/// Returns the embedded profile with the given id.
///
/// # Errors
///
/// Returns [`ProfileError::UnknownProfile`] if no embedded profile has
/// that id.
pub fn profile(id: &str) -> Result<MunicipalityProfile, ProfileError> {
    let mut profiles = all_profiles();
    let available = profiles
        .iter()
        .map(|p| p.id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    profiles
        .iter()
        .position(|p| p.id == id)
        .map(|i| profiles.swap_remove(i))
        .ok_or_else(|| ProfileError::UnknownProfile {
            id: id.to_string(),
            available,
        })
}
