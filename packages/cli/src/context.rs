//! Profile loading and service construction shared by every command.

use std::path::PathBuf;

use geo_gestion_address::{AddressCorrector, StreetRegistry};
use geo_gestion_geocoder::GeoResolver;
use geo_gestion_geocoder::nominatim::NominatimGeocoder;
use geo_gestion_municipality::{DEFAULT_PROFILE, MunicipalityProfile, ProfileError};
use geo_gestion_pipeline::AddressService;
use geo_gestion_scraper::{ScrapeError, streets};

/// Options common to all commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Settings {
    /// Embedded municipality profile id (default: `conchali`)
    #[arg(long, global = true)]
    pub profile: Option<String>,
    /// Load the municipality profile from a TOML file instead
    #[arg(long, global = true, conflicts_with = "profile")]
    pub profile_file: Option<PathBuf>,
    /// Minimum similarity score (0-100) for a street correction
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,
    /// Skip the street registry download and geocode addresses as typed
    #[arg(long, global = true)]
    pub no_correct: bool,
    /// Abort if the street registry cannot be fetched
    #[arg(long, global = true, conflicts_with = "no_correct")]
    pub strict: bool,
}

/// Everything a command needs.
pub struct Context {
    pub profile: MunicipalityProfile,
    pub client: reqwest::Client,
    pub service: AddressService<NominatimGeocoder>,
}

/// Resolves the profile selected by `settings`.
///
/// # Errors
///
/// Returns [`ProfileError`] if the profile file cannot be loaded or the id
/// is unknown.
pub fn load_profile(settings: &Settings) -> Result<MunicipalityProfile, ProfileError> {
    if let Some(path) = &settings.profile_file {
        return geo_gestion_municipality::from_path(path);
    }
    geo_gestion_municipality::profile(settings.profile.as_deref().unwrap_or(DEFAULT_PROFILE))
}

async fn load_registry(
    settings: &Settings,
    profile: &MunicipalityProfile,
    client: &reqwest::Client,
) -> Result<StreetRegistry, ScrapeError> {
    if settings.no_correct {
        log::info!("Street correction disabled");
        return Ok(StreetRegistry::empty());
    }

    let cfg = &profile.streets;
    if settings.strict {
        let names =
            streets::fetch_street_names(client, &cfg.url, &cfg.selector, cfg.timeout()).await?;
        return Ok(StreetRegistry::from_names(names));
    }

    Ok(streets::load_registry(client, &cfg.url, &cfg.selector, cfg.timeout()).await)
}

/// Loads the profile and street registry and wires up the service.
///
/// # Errors
///
/// Returns an error if the profile cannot be loaded, the HTTP client cannot
/// be built, or (with `--strict`) the street registry cannot be fetched.
pub async fn build(settings: &Settings) -> Result<Context, Box<dyn std::error::Error>> {
    let profile = load_profile(settings)?;
    log::info!("Using profile '{}' ({})", profile.id, profile.name);

    let client = reqwest::Client::builder().build()?;
    let registry = load_registry(settings, &profile, &client).await?;

    let threshold = settings
        .threshold
        .unwrap_or(profile.correction.threshold);
    let corrector = AddressCorrector::new(threshold).with_scorer(profile.correction.scorer);
    let geocoder = profile.geocoder.build_geocoder(client.clone());
    let resolver = GeoResolver::new(geocoder, profile.resolver_config());

    let service = AddressService::new(registry, corrector, resolver);

    Ok(Context {
        profile,
        client,
        service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_embedded_profile() {
        let p = load_profile(&Settings::default()).unwrap();
        assert_eq!(p.id, DEFAULT_PROFILE);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let settings = Settings {
            profile: Some("atlantis".to_string()),
            ..Settings::default()
        };
        assert!(matches!(
            load_profile(&settings),
            Err(ProfileError::UnknownProfile { .. })
        ));
    }

    #[tokio::test]
    async fn no_correct_skips_the_registry_download() {
        let settings = Settings {
            no_correct: true,
            ..Settings::default()
        };
        let ctx = build(&settings).await.unwrap();
        assert!(ctx.service.registry().is_empty());
        assert_eq!(
            ctx.service.correct_address("Tres Ote. 5317").text,
            "Tres Ote. 5317"
        );
    }

    fn unreachable_profile() -> MunicipalityProfile {
        geo_gestion_municipality::from_toml_str(
            r#"
            id = "offline"
            name = "Offline"
            locality = "Offline"
            region = "Chile"

            [streets]
            url = "notascheme://streets"

            [geocoder]
            type = "nominatim"
            base_url = "https://nominatim.example.com/search"
            user_agent_prefix = "offline"
        "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn strict_fails_when_registry_is_unreachable() {
        let settings = Settings {
            strict: true,
            ..Settings::default()
        };
        let client = reqwest::Client::new();
        let result = load_registry(&settings, &unreachable_profile(), &client).await;
        assert!(matches!(result, Err(ScrapeError::Http(_))));
    }

    #[tokio::test]
    async fn lenient_load_degrades_to_empty_registry() {
        let client = reqwest::Client::new();
        let registry = load_registry(&Settings::default(), &unreachable_profile(), &client)
            .await
            .unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn threshold_flag_overrides_profile() {
        let settings = Settings {
            no_correct: true,
            threshold: Some(95),
            ..Settings::default()
        };
        let ctx = build(&settings).await.unwrap();
        assert_eq!(ctx.service.corrector().threshold, 95);
    }
}
