//! Error types and handling for weather lookups

use std::fmt;
use thiserror::Error;

/// Classifies upstream failures so callers can decide what to surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Connection could not be established or was reset
    UpstreamUnreachable,
    /// The request exceeded the configured timeout
    UpstreamTimeout,
    /// The provider answered with a non-success HTTP status
    UpstreamStatus,
    /// The response body was missing fields or could not be decoded
    UpstreamInvalidResponse,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorCode::UpstreamUnreachable => "upstream_unreachable",
            ErrorCode::UpstreamTimeout => "upstream_timeout",
            ErrorCode::UpstreamStatus => "upstream_status",
            ErrorCode::UpstreamInvalidResponse => "upstream_invalid_response",
        };
        f.write_str(code)
    }
}

/// Main error type for weather lookups
#[derive(Error, Debug)]
pub enum WeatherLookupError {
    /// Bad caller input (blank city, day count out of range)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Geocoding returned no match
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Network failure, non-success status or malformed provider response
    #[error("Upstream error ({code}): {message}")]
    Upstream { code: ErrorCode, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherLookupError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Self::Upstream {
            code,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Upstream error code, if this is an upstream failure
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            WeatherLookupError::Upstream { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether repeating the same call later could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::UpstreamUnreachable | ErrorCode::UpstreamTimeout | ErrorCode::UpstreamStatus)
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherLookupError::InvalidInput { message } => format!("Invalid input: {message}"),
            WeatherLookupError::NotFound { message } => message.clone(),
            WeatherLookupError::Upstream {
                code: ErrorCode::UpstreamTimeout,
                ..
            } => "The weather service did not respond in time. Please try again.".to_string(),
            WeatherLookupError::Upstream { message, .. } => {
                format!("Error fetching weather data: {message}")
            }
            WeatherLookupError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
        }
    }
}
