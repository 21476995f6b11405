//! Location model for geocoded places

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geocoded place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Display name as returned by the geocoder (e.g. "Tokyo")
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Country name
    pub country: Option<String>,
    /// Country code (ISO 3166-1 alpha-2)
    pub country_code: Option<String>,
    /// First-level administrative area (state, prefecture, ...)
    pub admin1: Option<String>,
    /// IANA time zone of the place
    pub timezone: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            country: None,
            country_code: None,
            admin1: None,
            timezone: None,
        }
    }

    /// Create location with country
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>, country_code: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self.country_code = Some(country_code.into());
        self
    }

    /// Whether both coordinates are within their valid ranges
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// True if `hint` names this location's country, by code or by name
    #[must_use]
    pub fn matches_country(&self, hint: &str) -> bool {
        let hint = hint.trim();
        if hint.is_empty() {
            return false;
        }
        self.country_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(hint))
            || self
                .country
                .as_deref()
                .is_some_and(|country| country.to_lowercase() == hint.to_lowercase())
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}, {}", self.name, country),
            None => f.write_str(&self.name),
        }
    }
}
