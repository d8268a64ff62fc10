use crate::core::error::{ApiError, ApiResult};
use crate::core::models::{Location, PrayerTimes};
use crate::core::traits::PrayerTimesSource;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

/// Umm Al-Qura University, Makkah
const CALCULATION_METHOD: &str = "4";

#[derive(Debug, Deserialize)]
struct TimingsResponse {
    code: u16,
    status: String,
    data: Option<PrayerTimes>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    data: Option<serde_json::Value>,
}

/// Client for `api.aladhan.com`
pub struct AladhanClient {
    base_url: String,
    http: Client,
}

impl AladhanClient {
    pub fn new(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

impl PrayerTimesSource for AladhanClient {
    fn prayer_times(&self, location: &Location) -> ApiResult<Option<PrayerTimes>> {
        if location.city.is_empty() || location.country.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/timingsByCity", self.base_url);
        debug!(%url, %location, "GET");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("city", location.city.as_str()),
                ("country", location.country.as_str()),
                ("method", CALCULATION_METHOD),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(error_from_body(&body).unwrap_or_else(|| ApiError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }));
        }

        let body: TimingsResponse = response.json()?;
        parse_timings(body).map(Some)
    }
}

fn parse_timings(body: TimingsResponse) -> ApiResult<PrayerTimes> {
    match (body.code, body.data) {
        (200, Some(times)) => Ok(times),
        _ => Err(ApiError::Api(body.status)),
    }
}

/// The API puts a human-readable reason in `data` on failure.
fn error_from_body(body: &str) -> Option<ApiError> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    match parsed.data? {
        serde_json::Value::String(message) if !message.is_empty() => Some(ApiError::Api(message)),
        _ => None,
    }
}
