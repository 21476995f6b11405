//! Daily forecast model

use super::{Location, WeatherCategory};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Forecast for one calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    /// Calendar date, serialized as ISO 8601 (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Daily maximum temperature in Celsius
    pub high_c: f64,
    /// Daily minimum temperature in Celsius
    pub low_c: f64,
    pub weather_code: i32,
    pub condition_text: String,
    pub category: WeatherCategory,
    /// Precipitation sum in mm, when the provider has one
    pub precipitation_mm: Option<f64>,
}

/// Multi-day forecast for a location
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherForecast {
    /// Location for this forecast
    pub location: Location,
    /// One entry per day starting today, sorted by date
    pub days: Vec<ForecastDay>,
    /// When this forecast was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl WeatherForecast {
    /// Create new forecast
    #[must_use]
    pub fn new(location: Location, days: Vec<ForecastDay>) -> Self {
        Self {
            location,
            days,
            retrieved_at: Utc::now(),
        }
    }

    /// Whether dates are strictly ascending
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        self.days.windows(2).all(|pair| pair[0].date < pair[1].date)
    }
}

impl fmt::Display for WeatherForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Day Forecast for {}:", self.days.len(), self.location)?;
        for day in &self.days {
            write!(
                f,
                "\n\n{}: {}\n  High: {}°C / Low: {}°C",
                day.date.format("%Y-%m-%d"),
                day.condition_text,
                day.high_c,
                day.low_c
            )?;
            if let Some(precipitation) = day.precipitation_mm {
                write!(f, "\n  Precipitation: {precipitation} mm")?;
            }
        }
        Ok(())
    }
}
