#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding of corrected addresses.
//!
//! Converts a corrected street address to latitude/longitude through an
//! external provider (Nominatim / `OpenStreetMap` by default), wrapped in
//! the policies an unreliable public service needs:
//!
//! - a read-through [`cache::GeocodeCache`] keyed by address and locality,
//!   with a time-to-live;
//! - a [`throttle::Throttle`] spacing consecutive requests (the public
//!   Nominatim instance allows **1 request per second**);
//! - bounded [`retry`] with exponential backoff for transient failures;
//! - an optional locale check on the provider's address details.
//!
//! [`resolver::GeoResolver`] ties these together and never returns an
//! error: every outcome is a [`Resolution`].

pub mod cache;
pub mod nominatim;
pub mod resolver;
pub mod retry;
pub mod throttle;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use resolver::{GeoResolver, ResolverConfig};

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// A single provider match.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    /// Where the provider placed the address.
    pub coordinate: GeoCoordinate,
    /// The provider's formatted address for the match.
    pub display_name: Option<String>,
    /// Structured address components (`"suburb"`, `"city"`, `"road"`, ...).
    pub address: BTreeMap<String, String>,
}

/// Errors from a geocoding provider.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a server error.
    #[error("Service unavailable: {message}")]
    Unavailable {
        /// Description of the failure (usually the HTTP status).
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider rejected the request.
    #[error("Unexpected HTTP status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

impl GeocodeError {
    /// Returns `true` if the provider is likely to recover on its own
    /// (timeouts, dropped connections, rate limiting, 5xx responses).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_body(),
            Self::Unavailable { .. } | Self::RateLimited => true,
            Self::Status { .. } | Self::Parse { .. } => false,
        }
    }
}

/// A geocoding provider.
///
/// `query` is a complete single-line address. `user_agent` identifies the
/// client for this request; providers that support it should send it as
/// the `User-Agent` header.
pub trait Geocoder: Send + Sync {
    /// Looks up `query`, returning the best match or `None` when the
    /// provider found nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider could not be reached or its
    /// response could not be understood.
    fn geocode(
        &self,
        query: &str,
        user_agent: &str,
    ) -> impl Future<Output = Result<Option<GeocodeHit>, GeocodeError>> + Send;

    /// Short provider identifier for logs (e.g. `"nominatim"`).
    fn name(&self) -> &str;
}

impl<G: Geocoder> Geocoder for Arc<G> {
    fn geocode(
        &self,
        query: &str,
        user_agent: &str,
    ) -> impl Future<Output = Result<Option<GeocodeHit>, GeocodeError>> + Send {
        self.as_ref().geocode(query, user_agent)
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }
}

/// Whether a provider match must be confirmed to lie in the requested
/// locality.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocalePolicy {
    /// Accept whatever the provider returns.
    #[default]
    AcceptAny,
    /// Accept a match only if one of its locality-like address components
    /// (city, town, suburb, ...) equals the requested locality.
    RequireLocality,
}

/// Outcome of resolving one corrected address.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The provider located the address.
    Found(GeoCoordinate),
    /// The provider ran and found nothing (or nothing in the locality).
    NotFound,
    /// The provider is temporarily unreachable; retrying later may help.
    Unavailable(String),
    /// Any other provider failure.
    Failed(String),
    /// The address was blank, so no lookup was made.
    Skipped,
}

impl Resolution {
    /// The coordinate, if the address was located.
    #[must_use]
    pub const fn coordinate(&self) -> Option<GeoCoordinate> {
        match self {
            Self::Found(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns `true` for [`Resolution::Found`].
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
