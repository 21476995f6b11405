//! Configuration management for weather lookups
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherLookupError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest forecast the provider is asked for
pub const MAX_FORECAST_DAYS: u32 = 7;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherLookupConfig {
    /// Upstream API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Forecast request settings
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Forecast endpoint (serves both current conditions and daily forecasts)
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Shortest backoff between retries
    #[serde(default = "default_retry_min_backoff")]
    pub retry_min_backoff_ms: u64,
    /// Longest backoff between retries
    #[serde(default = "default_retry_max_backoff")]
    pub retry_max_backoff_ms: u64,
    /// Candidates requested from the geocoder (the country hint picks among them)
    #[serde(default = "default_geocoding_result_count")]
    pub geocoding_result_count: u32,
    /// Language for geocoding result names
    #[serde(default = "default_language")]
    pub language: String,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// What to do with a forecast day count outside 1..=7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCountPolicy {
    /// Fail with an invalid input error
    #[default]
    Reject,
    /// Clamp into range
    Clamp,
}

/// Forecast request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Days requested when the caller does not say
    #[serde(default = "default_forecast_days")]
    pub default_days: u32,
    #[serde(default)]
    pub day_count_policy: DayCountPolicy,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_min_backoff() -> u64 {
    200
}

fn default_retry_max_backoff() -> u64 {
    2000
}

fn default_geocoding_result_count() -> u32 {
    5
}

fn default_language() -> String {
    "en".to_string()
}

fn default_user_agent() -> String {
    format!("weather-lookup/{}", env!("CARGO_PKG_VERSION"))
}

fn default_forecast_days() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_min_backoff_ms: default_retry_min_backoff(),
            retry_max_backoff_ms: default_retry_max_backoff(),
            geocoding_result_count: default_geocoding_result_count(),
            language: default_language(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_days: default_forecast_days(),
            day_count_policy: DayCountPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherLookupConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let explicit = config_path.is_some();
        // An explicit path must exist; the default location is optional
        let config_file = config_path
            .or_else(Self::get_config_path)
            .filter(|path| explicit || path.exists());

        if let Some(config_file) = config_file {
            builder = builder.add_source(
                File::from(config_file)
                    .required(explicit)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_LOOKUP_WEATHER__TIMEOUT_SECONDS=5 overrides weather.timeout_seconds
        builder = builder.add_source(
            Environment::with_prefix("WEATHER_LOOKUP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherLookupConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-lookup").join("config.toml"))
    }

    /// Replace blank strings and zero sizes with their defaults
    pub fn apply_defaults(&mut self) {
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.weather.forecast_url.is_empty() {
            self.weather.forecast_url = default_forecast_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.weather.geocoding_result_count == 0 {
            self.weather.geocoding_result_count = default_geocoding_result_count();
        }
        if self.weather.language.is_empty() {
            self.weather.language = default_language();
        }
        if self.weather.user_agent.is_empty() {
            self.weather.user_agent = default_user_agent();
        }
        if self.forecast.default_days == 0 {
            self.forecast.default_days = default_forecast_days();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                WeatherLookupError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(WeatherLookupError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.weather.retry_min_backoff_ms > self.weather.retry_max_backoff_ms {
            return Err(WeatherLookupError::config(
                "retry_min_backoff_ms cannot be larger than retry_max_backoff_ms",
            )
            .into());
        }

        if !(1..=100).contains(&self.weather.geocoding_result_count) {
            return Err(WeatherLookupError::config(
                "Geocoding result count must be between 1 and 100",
            )
            .into());
        }

        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast.default_days) {
            return Err(WeatherLookupError::config(format!(
                "Default forecast days must be between 1 and {MAX_FORECAST_DAYS}"
            ))
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherLookupError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherLookupError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (field, url) in [
            ("geocoding_url", &self.weather.geocoding_url),
            ("forecast_url", &self.weather.forecast_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherLookupError::config(format!(
                    "Weather API {field} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WeatherLookupConfig::default();
        assert_eq!(
            config.weather.geocoding_url,
            "https://geocoding-api.open-meteo.com/v1/search"
        );
        assert_eq!(config.weather.forecast_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.weather.max_retries, 1);
        assert_eq!(config.weather.geocoding_result_count, 5);
        assert_eq!(config.forecast.default_days, 5);
        assert_eq!(config.forecast.day_count_policy, DayCountPolicy::Reject);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherLookupConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WeatherLookupConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = WeatherLookupConfig::default();
        config.forecast.default_days = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = WeatherLookupConfig::default();
        config.weather.forecast_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("forecast_url"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = WeatherLookupConfig::default();
        config.weather.geocoding_url.clear();
        config.weather.timeout_seconds = 0;
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.weather.geocoding_url.starts_with("https://"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("weather-lookup-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[weather]\ntimeout_seconds = 7\n\n[forecast]\nday_count_policy = \"clamp\"\n"
        )
        .unwrap();

        let config = WeatherLookupConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.weather.timeout_seconds, 7);
        assert_eq!(config.forecast.day_count_policy, DayCountPolicy::Clamp);
        // untouched sections keep their defaults
        assert_eq!(config.weather.max_retries, 1);
        assert_eq!(config.logging.level, "info");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = PathBuf::from("/definitely/not/here/weather-lookup.toml");
        assert!(WeatherLookupConfig::load_from_path(Some(path)).is_err());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WeatherLookupConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weather-lookup"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
