use chrono::{DateTime, FixedOffset};

use crate::model::WeatherObservation;

/// A write whose timestamp predates the city's latest observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfOrder {
    pub new: DateTime<FixedOffset>,
    pub current: DateTime<FixedOffset>,
}

/// Reject `candidate` if it is older than `latest`. Equal instants pass.
pub fn check_newer(
    latest: &WeatherObservation,
    candidate: &WeatherObservation,
) -> Result<(), OutOfOrder> {
    if latest.timestamp > candidate.timestamp {
        return Err(OutOfOrder {
            new: candidate.timestamp,
            current: latest.timestamp,
        });
    }
    Ok(())
}
