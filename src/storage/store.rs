use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::model::{display_timestamp, City, WeatherObservation};
use crate::storage::ordering::{check_newer, OutOfOrder};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("city not found")]
    NotFound { city: City },
    #[error(
        "new weather data: {} is older than current data: {}",
        display_timestamp(.new),
        display_timestamp(.current)
    )]
    Ordering {
        new: DateTime<FixedOffset>,
        current: DateTime<FixedOffset>,
    },
    #[error("city_name '{body}' does not match city '{path}' in the request path")]
    CityMismatch { path: City, body: City },
}

impl From<OutOfOrder> for StoreError {
    fn from(e: OutOfOrder) -> Self {
        StoreError::Ordering {
            new: e.new,
            current: e.current,
        }
    }
}

/// Per-city observation histories, oldest first.
///
/// A city key is present only while its history is non-empty, and `order`
/// lists present cities in the order they were first added.
#[derive(Debug, Default)]
pub struct WeatherStore {
    histories: HashMap<City, Vec<WeatherObservation>>,
    order: Vec<City>,
}

impl WeatherStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `obs` to its city's history, creating the history on first write.
    pub fn add(&mut self, obs: WeatherObservation) -> Result<WeatherObservation, StoreError> {
        let city = obs.city_name;
        match self.histories.get_mut(&city) {
            Some(history) => Self::append(history, obs),
            None => {
                tracing::debug!(%city, timestamp = %obs.timestamp, "creating city history");
                self.histories.insert(city, vec![obs.clone()]);
                self.order.push(city);
                Ok(obs)
            }
        }
    }

    /// Append to an existing city's history; the city must already be present.
    pub fn update(
        &mut self,
        city: City,
        obs: WeatherObservation,
    ) -> Result<WeatherObservation, StoreError> {
        let history = self
            .histories
            .get_mut(&city)
            .ok_or(StoreError::NotFound { city })?;

        if obs.city_name != city {
            tracing::warn!(path = %city, body = %obs.city_name, "rejecting update for mismatched city");
            return Err(StoreError::CityMismatch {
                path: city,
                body: obs.city_name,
            });
        }

        Self::append(history, obs)
    }

    pub fn latest(&self, city: City) -> Result<&WeatherObservation, StoreError> {
        self.histories
            .get(&city)
            .and_then(|history| history.last())
            .ok_or(StoreError::NotFound { city })
    }

    /// Latest observation of every present city, in first-added order.
    pub fn all_latest(&self) -> Vec<WeatherObservation> {
        self.order
            .iter()
            .filter_map(|city| self.histories.get(city).and_then(|h| h.last()))
            .cloned()
            .collect()
    }

    /// Drop a city's whole history.
    pub fn delete(&mut self, city: City) -> Result<(), StoreError> {
        match self.histories.remove(&city) {
            Some(history) if !history.is_empty() => {
                self.order.retain(|c| *c != city);
                tracing::debug!(%city, entries = history.len(), "deleted city history");
                Ok(())
            }
            _ => Err(StoreError::NotFound { city }),
        }
    }

    #[cfg(test)]
    pub(crate) fn history(&self, city: City) -> Option<&[WeatherObservation]> {
        self.histories.get(&city).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn append(
        history: &mut Vec<WeatherObservation>,
        obs: WeatherObservation,
    ) -> Result<WeatherObservation, StoreError> {
        if let Some(latest) = history.last() {
            if let Err(e) = check_newer(latest, &obs) {
                tracing::warn!(
                    city = %obs.city_name,
                    new = %e.new,
                    current = %e.current,
                    "rejecting out-of-order observation"
                );
                return Err(e.into());
            }
        }
        history.push(obs.clone());
        tracing::debug!(
            city = %obs.city_name,
            timestamp = %obs.timestamp,
            entries = history.len(),
            "appended observation"
        );
        Ok(obs)
    }
}
