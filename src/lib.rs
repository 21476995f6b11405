//! `weather-lookup` - city weather over the Open-Meteo APIs
//!
//! Resolves a place name to coordinates, then fetches current conditions or a
//! daily forecast, with WMO weather codes turned into readable text. Agent
//! tool wrappers call [`resolve_location`], [`get_current_weather`] and
//! [`get_weather_forecast`] after a single [`init`].

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;

// Re-export core types for public API
pub use api::OpenMeteoClient;
pub use config::{DayCountPolicy, WeatherLookupConfig};
pub use error::{ErrorCode, WeatherLookupError};
pub use models::{
    CurrentConditions, CurrentWeather, ForecastDay, Location, WeatherCategory, WeatherForecast,
    describe_weather_code,
};
pub use service::{
    WeatherLookupService, get_current_weather, get_weather_forecast, init, resolve_location,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherLookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
