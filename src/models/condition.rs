//! WMO weather code interpretation
//!
//! See <https://open-meteo.com/en/docs#weathervariables> for the code list.

use serde::{Deserialize, Serialize};

/// Label for codes outside the table
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Convert a WMO weather code to a human-readable description.
///
/// Total over all integers: unmapped codes yield [`UNKNOWN_CONDITION`].
#[must_use]
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_CONDITION,
    }
}

/// Coarse grouping of weather codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherCategory {
    /// Group a WMO code. Freezing drizzle and freezing rain stay with drizzle and rain.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "Clear sky")]
    #[case(3, "Overcast")]
    #[case(45, "Foggy")]
    #[case(57, "Dense freezing drizzle")]
    #[case(65, "Heavy rain")]
    #[case(77, "Snow grains")]
    #[case(82, "Violent rain showers")]
    #[case(99, "Thunderstorm with heavy hail")]
    fn test_known_codes(#[case] code: i32, #[case] expected: &str) {
        assert_eq!(describe_weather_code(code), expected);
    }

    #[rstest]
    #[case(4)]
    #[case(50)]
    #[case(100)]
    #[case(999)]
    #[case(-1)]
    fn test_unmapped_codes_are_unknown(#[case] code: i32) {
        assert_eq!(describe_weather_code(code), "Unknown");
        assert_eq!(WeatherCategory::from_code(code), WeatherCategory::Unknown);
    }

    #[test]
    fn test_table_is_total_over_code_range() {
        for code in -10..=200 {
            assert!(!describe_weather_code(code).is_empty());
        }
    }

    #[test]
    fn test_every_described_code_has_a_category() {
        for code in 0..=99 {
            let described = describe_weather_code(code) != UNKNOWN_CONDITION;
            let categorized = WeatherCategory::from_code(code) != WeatherCategory::Unknown;
            assert_eq!(described, categorized, "code {code}");
        }
    }

    #[rstest]
    #[case(1, WeatherCategory::Clear)]
    #[case(2, WeatherCategory::Cloudy)]
    #[case(48, WeatherCategory::Fog)]
    #[case(56, WeatherCategory::Drizzle)]
    #[case(80, WeatherCategory::Rain)]
    #[case(86, WeatherCategory::Snow)]
    #[case(96, WeatherCategory::Thunderstorm)]
    fn test_categories(#[case] code: i32, #[case] expected: WeatherCategory) {
        assert_eq!(WeatherCategory::from_code(code), expected);
    }
}
