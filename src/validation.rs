use chrono::{DateTime, NaiveDateTime, SubsecRound};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{City, Condition, WeatherObservation};

pub const MIN_TEMPERATURE: f64 = -90.0;
pub const MAX_TEMPERATURE: f64 = 70.0;

/// 2000-01-01T00:00:00Z as seconds since the Unix epoch.
const TIMESTAMP_FLOOR_SECS: i64 = 946_684_800;

/// Wire shape of an observation before any domain checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawObservation {
    pub city_name: String,
    pub temperature: f64,
    pub condition: String,
    pub timestamp: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid request body: {0}")]
    Malformed(String),
    #[error("city_name: unknown city '{0}'")]
    UnknownCity(String),
    #[error("temperature: {0} is outside the range (-90, 70)")]
    TemperatureOutOfRange(f64),
    #[error("condition: unknown condition '{0}'")]
    UnknownCondition(String),
    #[error("timestamp: '{0}' is not a valid RFC 3339 datetime")]
    InvalidTimestamp(String),
    #[error("timestamp: '{0}' has no timezone offset")]
    NaiveTimestamp(String),
    #[error("timestamp: '{0}' must be after 2000-01-01T00:00:00Z")]
    TimestampTooEarly(String),
}

/// Decode a JSON request body and validate it into an observation.
pub fn parse(input: &[u8]) -> Result<WeatherObservation, ValidationError> {
    let raw: RawObservation =
        serde_json::from_slice(input).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    validate(raw)
}

/// Check every field constraint, reporting the first one violated.
pub fn validate(raw: RawObservation) -> Result<WeatherObservation, ValidationError> {
    let city_name = raw
        .city_name
        .parse::<City>()
        .map_err(|e| ValidationError::UnknownCity(e.0))?;

    if !(raw.temperature > MIN_TEMPERATURE && raw.temperature < MAX_TEMPERATURE) {
        return Err(ValidationError::TemperatureOutOfRange(raw.temperature));
    }

    let condition = raw
        .condition
        .parse::<Condition>()
        .map_err(|e| ValidationError::UnknownCondition(e.0))?;

    // stored at microsecond precision, the same precision errors are rendered with
    let timestamp = match DateTime::parse_from_rfc3339(&raw.timestamp) {
        Ok(ts) => ts.trunc_subsecs(6),
        Err(_) if is_naive_datetime(&raw.timestamp) => {
            return Err(ValidationError::NaiveTimestamp(raw.timestamp));
        }
        Err(_) => return Err(ValidationError::InvalidTimestamp(raw.timestamp)),
    };

    if (timestamp.timestamp(), timestamp.timestamp_subsec_nanos()) <= (TIMESTAMP_FLOOR_SECS, 0) {
        return Err(ValidationError::TimestampTooEarly(raw.timestamp));
    }

    Ok(WeatherObservation {
        city_name,
        temperature: raw.temperature,
        condition,
        timestamp,
    })
}

fn is_naive_datetime(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
}
