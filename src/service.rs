//! Weather lookup service
//!
//! Resolves a place name to a [`Location`] and fetches current conditions or a
//! daily forecast for it. Every call is an independent geocode-then-fetch round
//! trip; nothing is cached between calls.

use crate::api::OpenMeteoClient;
use crate::config::{DayCountPolicy, MAX_FORECAST_DAYS, WeatherLookupConfig};
use crate::models::{CurrentWeather, Location, WeatherForecast};
use crate::{ErrorCode, Result, WeatherLookupError};
use std::sync::OnceLock;
use tracing::{debug, info, instrument};

static GLOBAL_SERVICE: OnceLock<WeatherLookupService> = OnceLock::new();

/// Stateless weather lookups over a shared, immutable HTTP client
#[derive(Clone)]
pub struct WeatherLookupService {
    client: OpenMeteoClient,
    default_days: u32,
    day_count_policy: DayCountPolicy,
}

impl WeatherLookupService {
    /// Build the service once; the HTTP client and its settings are reused by every call
    pub fn new(config: &WeatherLookupConfig) -> Result<Self> {
        Ok(Self {
            client: OpenMeteoClient::new(&config.weather)?,
            default_days: config.forecast.default_days,
            day_count_policy: config.forecast.day_count_policy,
        })
    }

    /// Forecast length used when the caller has no preference
    #[must_use]
    pub fn default_days(&self) -> u32 {
        self.default_days
    }

    /// Resolve a city (optionally disambiguated by country name or code) to coordinates
    #[instrument(skip(self))]
    pub async fn resolve_location(&self, city: &str, country: &str) -> Result<Location> {
        let city = validate_city(city)?;
        let country = country.trim();

        let code = country_code_hint(country);
        let mut results = self.client.geocode(city, code).await?;
        if results.is_empty() && code.is_some() {
            debug!("No '{}' in country '{}', searching all countries", city, country);
            results = self.client.geocode(city, None).await?;
        }
        if results.is_empty() {
            return Err(WeatherLookupError::not_found(format!(
                "City '{city}' not found. Please check the spelling."
            )));
        }

        let mut candidates: Vec<Location> = results.into_iter().map(Location::from).collect();
        let index = if country.is_empty() {
            0
        } else {
            candidates
                .iter()
                .position(|c| c.matches_country(country))
                .unwrap_or_else(|| {
                    debug!("No result in country '{}', using best match", country);
                    0
                })
        };
        let location = candidates.swap_remove(index);

        if !location.has_valid_coordinates() {
            return Err(WeatherLookupError::upstream(
                ErrorCode::UpstreamInvalidResponse,
                format!(
                    "Geocoder returned out-of-range coordinates for '{}': {}",
                    location.name,
                    location.format_coordinates()
                ),
            ));
        }

        info!(
            "Resolved '{}' to {} ({})",
            city,
            location,
            location.format_coordinates()
        );
        Ok(location)
    }

    /// Current conditions for a city
    #[instrument(skip(self))]
    pub async fn get_current_weather(&self, city: &str, country: &str) -> Result<CurrentWeather> {
        let location = self.resolve_location(city, country).await?;
        let conditions = self
            .client
            .current(location.latitude, location.longitude)
            .await?;
        Ok(CurrentWeather::new(location, conditions))
    }

    /// Daily forecast of `days` entries (1-7) starting today
    #[instrument(skip(self))]
    pub async fn get_weather_forecast(
        &self,
        city: &str,
        country: &str,
        days: u32,
    ) -> Result<WeatherForecast> {
        validate_city(city)?;
        let days = self.effective_days(days)?;

        let location = self.resolve_location(city, country).await?;
        let forecast_days = self
            .client
            .daily(location.latitude, location.longitude, days)
            .await?;
        Ok(WeatherForecast::new(location, forecast_days))
    }

    /// Apply the configured day-count policy
    pub fn effective_days(&self, days: u32) -> Result<u32> {
        match self.day_count_policy {
            DayCountPolicy::Clamp => Ok(days.clamp(1, MAX_FORECAST_DAYS)),
            DayCountPolicy::Reject if (1..=MAX_FORECAST_DAYS).contains(&days) => Ok(days),
            DayCountPolicy::Reject => Err(WeatherLookupError::invalid_input(format!(
                "days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
            ))),
        }
    }
}

fn validate_city(city: &str) -> Result<&str> {
    let city = city.trim();
    if city.is_empty() {
        return Err(WeatherLookupError::invalid_input("City name cannot be empty"));
    }
    Ok(city)
}

/// A two-letter hint is taken as an ISO country code the geocoder can filter on
fn country_code_hint(country: &str) -> Option<&str> {
    (country.len() == 2 && country.bytes().all(|b| b.is_ascii_alphabetic())).then_some(country)
}

/// Initializes the process-wide service. **Must be called once before the free functions.**
pub fn init(config: &WeatherLookupConfig) -> Result<()> {
    let service = WeatherLookupService::new(config)?;
    GLOBAL_SERVICE
        .set(service)
        .map_err(|_| WeatherLookupError::config("Weather lookup service already initialized"))
}

/// Returns the globally initialized service
pub fn global() -> Result<&'static WeatherLookupService> {
    GLOBAL_SERVICE.get().ok_or_else(|| {
        WeatherLookupError::config("Weather lookup service not initialized. Call init() first.")
    })
}

// Public, ergonomic entry points that use the global service.
pub async fn resolve_location(city: &str, country: &str) -> Result<Location> {
    global()?.resolve_location(city, country).await
}

pub async fn get_current_weather(city: &str, country: &str) -> Result<CurrentWeather> {
    global()?.get_current_weather(city, country).await
}

pub async fn get_weather_forecast(city: &str, country: &str, days: u32) -> Result<WeatherForecast> {
    global()?.get_weather_forecast(city, country, days).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn service(policy: DayCountPolicy) -> WeatherLookupService {
        let mut config = WeatherLookupConfig::default();
        config.forecast.day_count_policy = policy;
        WeatherLookupService::new(&config).unwrap()
    }

    #[rstest]
    #[case(1, Ok(1))]
    #[case(7, Ok(7))]
    #[case(0, Err(()))]
    #[case(8, Err(()))]
    fn test_reject_policy(#[case] days: u32, #[case] expected: std::result::Result<u32, ()>) {
        let result = service(DayCountPolicy::Reject).effective_days(days);
        match expected {
            Ok(n) => assert_eq!(result.unwrap(), n),
            Err(()) => assert!(matches!(
                result,
                Err(WeatherLookupError::InvalidInput { .. })
            )),
        }
    }

    #[rstest]
    #[case(0, 1)]
    #[case(3, 3)]
    #[case(30, 7)]
    fn test_clamp_policy(#[case] days: u32, #[case] expected: u32) {
        assert_eq!(service(DayCountPolicy::Clamp).effective_days(days).unwrap(), expected);
    }

    #[test]
    fn test_validate_city_trims() {
        assert_eq!(validate_city("  Tokyo ").unwrap(), "Tokyo");
        assert!(matches!(
            validate_city(" \t "),
            Err(WeatherLookupError::InvalidInput { .. })
        ));
    }

    #[rstest]
    #[case("AU", Some("AU"))]
    #[case("jp", Some("jp"))]
    #[case("Japan", None)]
    #[case("", None)]
    #[case("1A", None)]
    fn test_country_code_hint(#[case] hint: &str, #[case] expected: Option<&str>) {
        assert_eq!(country_code_hint(hint), expected);
    }

    #[test]
    fn test_default_days_from_config() {
        assert_eq!(service(DayCountPolicy::Reject).default_days(), 5);
    }
}
