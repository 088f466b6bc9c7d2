//! Read-through resolution of corrected addresses to coordinates.
//!
//! [`GeoResolver::resolve_in`] runs, in order:
//!
//! 1. Blank input → [`Resolution::Skipped`] (no provider call)
//! 2. Cache lookup keyed by `(address, locality)`
//! 3. Throttled provider request for `"{address}, {locality}, {region}"`,
//!    retried on transient failures if configured
//! 4. Optional locale confirmation of the match
//! 5. Cache write for hits (and misses, if enabled)
//!
//! Provider failures are logged and returned as [`Resolution::Unavailable`]
//! or [`Resolution::Failed`]; they are never cached and never propagated as
//! errors.

use std::time::Duration;

use geo_gestion_address::normalize;

use crate::cache::{CacheKey, GeocodeCache};
use crate::retry::with_retry;
use crate::throttle::Throttle;
use crate::{GeocodeHit, Geocoder, LocalePolicy, Resolution};

/// Address components that name the area an address belongs to, from most
/// to least specific.
const LOCALITY_COMPONENTS: &[&str] = &[
    "suburb",
    "city_district",
    "municipality",
    "town",
    "village",
    "city",
    "county",
];

/// Resolution policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Default locality qualifier appended to every query
    /// (e.g. `"Conchalí"`).
    pub locality: String,
    /// Region/country qualifier appended after the locality
    /// (e.g. `"Región Metropolitana, Chile"`).
    pub region: String,
    /// Whether matches outside the locality are discarded.
    pub locale_policy: LocalePolicy,
    /// Whether "not found" outcomes are cached.
    pub cache_misses: bool,
    /// How long cached outcomes stay valid.
    pub cache_ttl: Duration,
    /// Minimum spacing between provider requests.
    pub rate_limit: Duration,
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_backoff: Duration,
    /// Prefix of the per-request client identity.
    pub user_agent_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            locality: String::new(),
            region: String::new(),
            locale_policy: LocalePolicy::AcceptAny,
            cache_misses: true,
            cache_ttl: crate::cache::DEFAULT_TTL,
            rate_limit: Duration::from_secs(1),
            max_retries: 0,
            retry_backoff: Duration::from_secs(2),
            user_agent_prefix: "geo_gestion".to_string(),
        }
    }
}

/// Builds the provider query for an address in a locality.
///
/// Empty qualifiers are left out: `build_query("Dorsal 10", "", "Chile")`
/// is `"Dorsal 10, Chile"`.
#[must_use]
pub fn build_query(address: &str, locality: &str, region: &str) -> String {
    [address, locality, region]
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns a client identity unique to this moment:
/// `"{prefix}_{unix_millis}"`.
#[must_use]
pub fn client_identity(prefix: &str) -> String {
    format!("{prefix}_{}", chrono::Utc::now().timestamp_millis())
}

/// Returns `true` if one of the hit's locality-like components equals
/// `locality` after normalization.
#[must_use]
pub fn confirms_locality(hit: &GeocodeHit, locality: &str) -> bool {
    let wanted = normalize(locality);
    if wanted.is_empty() {
        return true;
    }
    LOCALITY_COMPONENTS
        .iter()
        .filter_map(|k| hit.address.get(*k))
        .any(|v| normalize(v) == wanted)
}

/// Resolves corrected addresses through a [`Geocoder`] with caching,
/// throttling, retry and locale policy.
#[derive(Debug)]
pub struct GeoResolver<G> {
    geocoder: G,
    config: ResolverConfig,
    cache: GeocodeCache,
    throttle: Throttle,
}

impl<G: Geocoder> GeoResolver<G> {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new(geocoder: G, config: ResolverConfig) -> Self {
        let cache = GeocodeCache::new(config.cache_ttl);
        let throttle = Throttle::new(config.rate_limit);
        Self {
            geocoder,
            config,
            cache,
            throttle,
        }
    }

    /// The resolution policy.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The underlying provider.
    #[must_use]
    pub const fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// The result cache.
    #[must_use]
    pub const fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Resolves `corrected` in the configured default locality.
    pub async fn resolve(&self, corrected: &str) -> Resolution {
        self.resolve_in(corrected, &self.config.locality).await
    }

    /// Resolves `corrected` in `locality`.
    pub async fn resolve_in(&self, corrected: &str, locality: &str) -> Resolution {
        let address = corrected.trim();
        if address.is_empty() {
            return Resolution::Skipped;
        }

        let key = CacheKey::new(address, locality);
        if let Some(cached) = self.cache.get(&key) {
            log::debug!("Geocode cache hit for '{address}' ({locality})");
            return cached.map_or(Resolution::NotFound, Resolution::Found);
        }

        let query = build_query(address, locality, &self.config.region);
        let outcome = {
            let query = query.as_str();
            let this = self;
            with_retry(self.config.max_retries, self.config.retry_backoff, move || async move {
                this.throttle.wait().await;
                let identity = client_identity(&this.config.user_agent_prefix);
                this.geocoder.geocode(query, &identity).await
            })
            .await
        };

        match outcome {
            Ok(Some(hit)) => {
                if self.config.locale_policy == LocalePolicy::RequireLocality
                    && !confirms_locality(&hit, locality)
                {
                    log::debug!(
                        "{}: match for '{query}' is outside {locality}: {:?}",
                        self.geocoder.name(),
                        hit.display_name
                    );
                    self.remember_miss(key);
                    return Resolution::NotFound;
                }
                self.cache.insert(key, Some(hit.coordinate));
                Resolution::Found(hit.coordinate)
            }
            Ok(None) => {
                log::debug!("{}: no match for '{query}'", self.geocoder.name());
                self.remember_miss(key);
                Resolution::NotFound
            }
            Err(e) if e.is_transient() => {
                log::warn!(
                    "{} temporarily unavailable for '{query}': {e}",
                    self.geocoder.name()
                );
                Resolution::Unavailable(e.to_string())
            }
            Err(e) => {
                log::error!("{} error for '{query}': {e}", self.geocoder.name());
                Resolution::Failed(e.to_string())
            }
        }
    }

    fn remember_miss(&self, key: CacheKey) {
        if self.config.cache_misses {
            self.cache.insert(key, None);
        }
    }
}
