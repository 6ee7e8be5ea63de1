use chrono::{DateTime, FixedOffset, SecondsFormat, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Cities the service accepts observations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    London,
    Manchester,
    Birmingham,
    Leeds,
    Liverpool,
    Sheffield,
    Bristol,
    Newcastle,
    Nottingham,
    Glasgow,
    Edinburgh,
    Cardiff,
    Belfast,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            City::London => "london",
            City::Manchester => "manchester",
            City::Birmingham => "birmingham",
            City::Leeds => "leeds",
            City::Liverpool => "liverpool",
            City::Sheffield => "sheffield",
            City::Bristol => "bristol",
            City::Newcastle => "newcastle",
            City::Nottingham => "nottingham",
            City::Glasgow => "glasgow",
            City::Edinburgh => "edinburgh",
            City::Cardiff => "cardiff",
            City::Belfast => "belfast",
        }
    }

    pub const fn all() -> &'static [City] {
        &[
            City::London,
            City::Manchester,
            City::Birmingham,
            City::Leeds,
            City::Liverpool,
            City::Sheffield,
            City::Bristol,
            City::Newcastle,
            City::Nottingham,
            City::Glasgow,
            City::Edinburgh,
            City::Cardiff,
            City::Belfast,
        ]
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

// Names are case-sensitive: "London" is not a known city.
impl FromStr for City {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    Cloudy,
    Rainy,
    Snowing,
    Hailing,
    Storm,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloudy",
            Condition::Rainy => "rainy",
            Condition::Snowing => "snowing",
            Condition::Hailing => "hailing",
            Condition::Storm => "storm",
        }
    }

    pub const fn all() -> &'static [Condition] {
        &[
            Condition::Sunny,
            Condition::Cloudy,
            Condition::Rainy,
            Condition::Snowing,
            Condition::Hailing,
            Condition::Storm,
        ]
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// A single validated reading. Only `validation::validate` builds these, so the
/// fields are read-only from outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherObservation {
    pub(crate) city_name: City,
    pub(crate) temperature: f64,
    pub(crate) condition: Condition,
    #[serde(serialize_with = "serialize_timestamp")]
    pub(crate) timestamp: DateTime<FixedOffset>,
}

impl WeatherObservation {
    pub fn city_name(&self) -> City {
        self.city_name
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

fn serialize_timestamp<S>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Human-readable rendering used in error messages, e.g. `2020-01-20 10:00:00+00:00`.
pub fn display_timestamp(ts: &DateTime<FixedOffset>) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S%:z").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
    }
}

/// Response body for `GET /weather`.
#[derive(Debug, Clone, Serialize)]
pub struct AllCityWeather {
    pub all_city_weather: Vec<WeatherObservation>,
}
