use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel stored in [`HikingSpot`] when the places API omits a rating field.
pub const MISSING_RATING: f64 = -1.0;
pub const MISSING_RATING_COUNT: i64 = -1;

/// Coordinates resolved by geocoding a free-text place name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Renders as `lat,lng`, the form the places search expects.
impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HikingSpot {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `-1` when the places API has no rating.
    pub rating: f64,
    /// `-1` when the places API has no rating count.
    pub total_ratings: i64,
}

impl HikingSpot {
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        rating: Option<f64>,
        total_ratings: Option<i64>,
    ) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            rating: rating.unwrap_or(MISSING_RATING),
            total_ratings: total_ratings.unwrap_or(MISSING_RATING_COUNT),
        }
    }

    pub fn rating(&self) -> Option<f64> {
        (self.rating != MISSING_RATING).then_some(self.rating)
    }

    pub fn total_ratings(&self) -> Option<i64> {
        (self.total_ratings != MISSING_RATING_COUNT).then_some(self.total_ratings)
    }
}

/// Current conditions for a city, normalised across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub provider: String,
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observation_time: DateTime<Utc>,
}

/// Opaque label correlating a sequence of chatbot exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
