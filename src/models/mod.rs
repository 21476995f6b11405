//! Data models for weather lookups
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geocoded place with coordinates
//! - Weather: Current conditions
//! - Forecast: Daily forecast collections
//! - Condition: WMO weather code table

pub mod condition;
pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use condition::{WeatherCategory, describe_weather_code};
pub use forecast::{ForecastDay, WeatherForecast};
pub use location::Location;
pub use weather::{CurrentConditions, CurrentWeather};
