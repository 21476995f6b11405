//! HTTP client for the `OpenMeteo` geocoding and forecast APIs
//!
//! This module owns the outbound side of a lookup: URL construction, the
//! per-request timeout, retry of transient failures, and mapping of transport,
//! status and body problems onto [`WeatherLookupError::Upstream`].

pub mod openmeteo;

use crate::config::WeatherConfig;
use crate::models::{CurrentConditions, ForecastDay};
use crate::{ErrorCode, Result, WeatherLookupError};
use openmeteo::{ApiErrorBody, ForecastResponse, GeocodingResponse, GeocodingResult};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryError, RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,precipitation";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code,precipitation_sum";

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Client for the `OpenMeteo` APIs. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    geocoding_url: String,
    forecast_url: String,
    geocoding_result_count: u32,
    language: String,
}

impl OpenMeteoClient {
    /// Create a new client with timeout and retry policy from `config`
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| WeatherLookupError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(
                Duration::from_millis(config.retry_min_backoff_ms),
                Duration::from_millis(config.retry_max_backoff_ms),
            )
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            geocoding_result_count: config.geocoding_result_count,
            language: config.language.clone(),
        })
    }

    /// Search the geocoder for `name`, restricted to `country_code` when given.
    /// An empty vector means no match.
    #[instrument(skip(self), fields(location = name))]
    pub async fn geocode(
        &self,
        name: &str,
        country_code: Option<&str>,
    ) -> Result<Vec<GeocodingResult>> {
        info!("Geocoding location: '{}'", name);
        let start_time = Instant::now();

        let mut url = format!(
            "{}?name={}&count={}&language={}&format=json",
            self.geocoding_url,
            urlencoding::encode(name),
            self.geocoding_result_count,
            urlencoding::encode(&self.language)
        );
        if let Some(code) = country_code {
            url.push_str("&countryCode=");
            url.push_str(&urlencoding::encode(&code.to_ascii_uppercase()));
        }

        let response: GeocodingResponse = self.get_json(&url, "geocoding").await?;
        let results = response.results.unwrap_or_default();

        if results.is_empty() {
            warn!("No results found for location '{}'", name);
        } else {
            info!(
                "Found {} geocoding results for '{}' in {:.3}s",
                results.len(),
                name,
                start_time.elapsed().as_secs_f64()
            );
            debug!(
                "Geocoding results: {:?}",
                results
                    .iter()
                    .map(|r| format!("{} ({:.4}, {:.4})", r.name, r.latitude, r.longitude))
                    .collect::<Vec<_>>()
            );
        }

        Ok(results)
    }

    /// Current conditions at the given coordinates
    #[instrument(skip(self))]
    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions> {
        info!("Getting current weather for coordinates: {:.4}, {:.4}", lat, lon);

        let url = format!(
            "{}?latitude={}&longitude={}&current={}&temperature_unit=celsius&wind_speed_unit=kmh&precipitation_unit=mm&timezone=auto",
            self.forecast_url, lat, lon, CURRENT_FIELDS
        );

        let response: ForecastResponse = self.get_json(&url, "weather").await?;
        let current = response.current.ok_or_else(|| {
            error!("Weather response for {:.4},{:.4} has no current block", lat, lon);
            WeatherLookupError::upstream(
                ErrorCode::UpstreamInvalidResponse,
                "No current weather data available from OpenMeteo",
            )
        })?;

        current.into_conditions()
    }

    /// Daily forecast of `days` entries starting today at the given coordinates
    #[instrument(skip(self))]
    pub async fn daily(&self, lat: f64, lon: f64, days: u32) -> Result<Vec<ForecastDay>> {
        info!(
            "Getting {}-day forecast for coordinates: {:.4}, {:.4}",
            days, lat, lon
        );

        let url = format!(
            "{}?latitude={}&longitude={}&daily={}&temperature_unit=celsius&precipitation_unit=mm&timezone=auto&forecast_days={}",
            self.forecast_url, lat, lon, DAILY_FIELDS, days
        );

        let response: ForecastResponse = self.get_json(&url, "forecast").await?;
        let daily = response.daily.ok_or_else(|| {
            error!("Forecast response for {:.4},{:.4} has no daily block", lat, lon);
            WeatherLookupError::upstream(
                ErrorCode::UpstreamInvalidResponse,
                "No daily forecast data available from OpenMeteo",
            )
        })?;

        daily.into_days(days as usize)
    }

    /// GET `url` and decode a successful JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        debug!("OpenMeteo {} request URL: {}", what, url);
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            let code = classify_send_error(&e);
            warn!("{} request failed ({}): {}", what, code, e);
            WeatherLookupError::upstream(code, format!("{what} request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.reason)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            warn!("{} request returned HTTP {}: {}", what, status.as_u16(), reason);
            return Err(WeatherLookupError::upstream(
                ErrorCode::UpstreamStatus,
                format!("{what} request failed with status {}: {reason}", status.as_u16()),
            ));
        }

        let body = response.text().await.map_err(|e| {
            let code = if e.is_timeout() {
                ErrorCode::UpstreamTimeout
            } else {
                ErrorCode::UpstreamUnreachable
            };
            WeatherLookupError::upstream(code, format!("Failed to read {what} response: {e}"))
        })?;

        let parsed = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse {} response: {}", what, e);
            WeatherLookupError::upstream(
                ErrorCode::UpstreamInvalidResponse,
                format!("Invalid {what} data received from OpenMeteo: {e}"),
            )
        })?;

        let total_duration = start_time.elapsed();
        if total_duration > SLOW_RESPONSE {
            warn!("Slow {} response: {:.3}s", what, total_duration.as_secs_f64());
        } else {
            debug!("{} response in {:.3}s", what, total_duration.as_secs_f64());
        }

        Ok(parsed)
    }
}

/// Timeouts may arrive wrapped by the retry middleware, with or without a retry count
fn classify_send_error(err: &reqwest_middleware::Error) -> ErrorCode {
    if is_timeout(err) {
        ErrorCode::UpstreamTimeout
    } else {
        ErrorCode::UpstreamUnreachable
    }
}

fn is_timeout(err: &reqwest_middleware::Error) -> bool {
    match err {
        reqwest_middleware::Error::Reqwest(e) => e.is_timeout(),
        reqwest_middleware::Error::Middleware(e) => e.chain().any(|cause| {
            if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
                return e.is_timeout();
            }
            if let Some(e) = cause.downcast_ref::<reqwest_middleware::Error>() {
                return is_timeout(e);
            }
            match cause.downcast_ref::<RetryError>() {
                Some(RetryError::Error(e) | RetryError::WithRetries { err: e, .. }) => is_timeout(e),
                None => false,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, max_retries: u32) -> OpenMeteoClient {
        let config = WeatherConfig {
            geocoding_url: format!("{}/v1/search", server.uri()),
            forecast_url: format!("{}/v1/forecast", server.uri()),
            max_retries,
            retry_min_backoff_ms: 10,
            retry_max_backoff_ms: 20,
            ..WeatherConfig::default()
        };
        OpenMeteoClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_sends_expected_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "San José"))
            .and(query_param("count", "5"))
            .and(query_param("language", "en"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "name": "San José", "latitude": 9.93333, "longitude": -84.08333, "country_code": "CR", "country": "Costa Rica" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server, 0).geocode("San José", None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].country_code.as_deref(), Some("CR"));
    }

    #[tokio::test]
    async fn test_geocode_sends_country_code() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Springfield"))
            .and(query_param("countryCode", "AU"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "name": "Springfield", "latitude": -27.65, "longitude": 152.91667, "country_code": "AU", "country": "Australia" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server, 0)
            .geocode("Springfield", Some("au"))
            .await
            .unwrap();
        assert_eq!(results[0].country_code.as_deref(), Some("AU"));
    }

    #[tokio::test]
    async fn test_status_error_includes_provider_reason() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, 0).current(95.0, 0.0).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UpstreamStatus));
        assert!(err.to_string().contains("Latitude must be in range"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, 0).geocode("Paris", None).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UpstreamInvalidResponse));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "name": "Paris", "latitude": 48.85341, "longitude": 2.3488 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server, 1).geocode("Paris", None).await.unwrap();
        assert_eq!(results[0].name, "Paris");
    }

    #[tokio::test]
    async fn test_no_retry_when_disabled() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, 0).geocode("Paris", None).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UpstreamStatus));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let server = MockServer::start().await;
        let client = client_for(&server, 0);
        // nothing listens once the server is gone
        drop(server);

        let err = client.geocode("Paris", None).await.unwrap_err();
        assert!(matches!(err, WeatherLookupError::Upstream { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_daily_requests_forecast_days() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("forecast_days", "2"))
            .and(query_param("daily", DAILY_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 48.86,
                "longitude": 2.3399997,
                "timezone": "Europe/Paris",
                "daily": {
                    "time": ["2024-05-01", "2024-05-02"],
                    "temperature_2m_max": [18.0, 19.0],
                    "temperature_2m_min": [9.0, 10.0],
                    "weather_code": [3, 80],
                    "precipitation_sum": [0.0, 2.5]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let days = client_for(&server, 0).daily(48.85, 2.35, 2).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].condition_text, "Slight rain showers");
    }
}
