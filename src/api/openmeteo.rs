//! `OpenMeteo` API response structures and conversion utilities

use crate::models::{
    CurrentConditions, ForecastDay, Location, WeatherCategory, describe_weather_code,
};
use crate::{ErrorCode, Result, WeatherLookupError};
use chrono::NaiveDate;
use serde::Deserialize;

/// Error body returned with 4xx/5xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub reason: String,
}

/// Geocoding response from `OpenMeteo`. `results` is absent when nothing matched.
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub admin1: Option<String>,
    pub timezone: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        Location {
            name: result.name,
            latitude: result.latitude,
            longitude: result.longitude,
            country: result.country,
            country_code: result.country_code,
            admin1: result.admin1,
            timezone: result.timezone,
        }
    }
}

/// Forecast endpoint response; which block is present depends on the query
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current: Option<CurrentData>,
    pub daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentData {
    pub time: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<f64>,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub weather_code: Option<i32>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Daily block: parallel arrays indexed by day
#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    #[serde(rename = "precipitation_sum", default)]
    pub precipitation: Vec<Option<f64>>,
}

fn invalid(message: impl Into<String>) -> WeatherLookupError {
    WeatherLookupError::upstream(ErrorCode::UpstreamInvalidResponse, message)
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| invalid(format!("missing '{field}' in weather response")))
}

impl CurrentData {
    /// Convert into fully populated conditions, or fail if any field is missing
    pub fn into_conditions(self) -> Result<CurrentConditions> {
        let weather_code = required(self.weather_code, "weather_code")?;
        let humidity = required(self.humidity, "relative_humidity_2m")?;

        Ok(CurrentConditions {
            temperature_c: required(self.temperature, "temperature_2m")?,
            apparent_temperature_c: required(self.apparent_temperature, "apparent_temperature")?,
            humidity_pct: humidity.round().clamp(0.0, 100.0) as u8,
            wind_speed_kph: required(self.wind_speed, "wind_speed_10m")?,
            precipitation_mm: required(self.precipitation, "precipitation")?,
            weather_code,
            condition_text: describe_weather_code(weather_code).to_string(),
            category: WeatherCategory::from_code(weather_code),
            observed_at: self.time,
        })
    }
}

impl DailyData {
    /// Zip the parallel arrays into forecast days.
    ///
    /// Fails unless every array has `expected` entries, every date parses and
    /// dates are strictly ascending.
    pub fn into_days(self, expected: usize) -> Result<Vec<ForecastDay>> {
        let len = self.time.len();
        if len != expected {
            return Err(invalid(format!(
                "expected {expected} forecast days, provider returned {len}"
            )));
        }
        if self.temperature_max.len() != len
            || self.temperature_min.len() != len
            || self.weather_code.len() != len
        {
            return Err(invalid("daily forecast arrays have mismatched lengths"));
        }

        let mut precipitation = self.precipitation.into_iter();
        let mut days: Vec<ForecastDay> = Vec::with_capacity(len);

        for (((time, high), low), code) in self
            .time
            .into_iter()
            .zip(self.temperature_max)
            .zip(self.temperature_min)
            .zip(self.weather_code)
        {
            let date = NaiveDate::parse_from_str(&time, "%Y-%m-%d")
                .map_err(|e| invalid(format!("invalid forecast date '{time}': {e}")))?;

            if let Some(previous) = days.last() {
                if previous.date >= date {
                    return Err(invalid(format!(
                        "forecast dates out of order: {} then {}",
                        previous.date, date
                    )));
                }
            }

            let weather_code = required(code, "weather_code")?;
            days.push(ForecastDay {
                date,
                high_c: required(high, "temperature_2m_max")?,
                low_c: required(low, "temperature_2m_min")?,
                weather_code,
                condition_text: describe_weather_code(weather_code).to_string(),
                category: WeatherCategory::from_code(weather_code),
                precipitation_mm: precipitation.next().flatten(),
            });
        }

        Ok(days)
    }
}
