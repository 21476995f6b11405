//! Current conditions model and its text rendering

use super::{Location, WeatherCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conditions observed at a location right now
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Perceived temperature in Celsius
    pub apparent_temperature_c: f64,
    /// Relative humidity in percent (0-100)
    pub humidity_pct: u8,
    /// Wind speed at 10 m in km/h
    pub wind_speed_kph: f64,
    /// Precipitation in mm
    pub precipitation_mm: f64,
    /// WMO weather code as reported
    pub weather_code: i32,
    /// Human-readable description, never empty
    pub condition_text: String,
    pub category: WeatherCategory,
    /// Provider-local observation time (ISO 8601, no offset)
    pub observed_at: String,
}

/// Current conditions paired with the place they were looked up for
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CurrentWeather {
    pub location: Location,
    pub conditions: CurrentConditions,
    /// When this data was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl CurrentWeather {
    #[must_use]
    pub fn new(location: Location, conditions: CurrentConditions) -> Self {
        Self {
            location,
            conditions,
            retrieved_at: Utc::now(),
        }
    }
}

impl fmt::Display for CurrentWeather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.conditions;
        writeln!(f, "Current Weather for {}:", self.location)?;
        writeln!(f, "Conditions: {}", c.condition_text)?;
        writeln!(f, "Temperature: {}°C", c.temperature_c)?;
        writeln!(f, "Feels Like: {}°C", c.apparent_temperature_c)?;
        writeln!(f, "Humidity: {}%", c.humidity_pct)?;
        writeln!(f, "Wind: {} km/h", c.wind_speed_kph)?;
        write!(f, "Precipitation: {} mm", c.precipitation_mm)
    }
}
