//! Geocoding, hiking-trail search and place autocomplete on the Google Maps web APIs.

use serde::Deserialize;
use std::sync::Arc;

use crate::{
    config::ApiKey,
    error::ServiceError,
    http::{HttpClient, parse_json},
    model::{GeoLocation, HikingSpot},
};

pub const GOOGLE_MAPS_API: &str = "https://maps.googleapis.com/maps/api";

/// Fixed text-search term combined with the user's location.
pub const HIKING_QUERY: &str = "hiking trail";

/// Places search radius around the geocoded point (50 km).
pub const SEARCH_RADIUS_METERS: u32 = 50_000;

#[derive(Debug, Clone)]
pub struct LocationService {
    api_key: ApiKey,
    http: Arc<dyn HttpClient>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: Option<String>,
    error_message: Option<String>,
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    geometry: Geometry,
    rating: Option<f64>,
    user_ratings_total: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    status: Option<String>,
    error_message: Option<String>,
    results: Option<Vec<PlaceResult>>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    description: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: Option<String>,
    error_message: Option<String>,
    predictions: Option<Vec<Prediction>>,
}

/// Google reports failures in the payload with a 200 status; `OK` and `ZERO_RESULTS` are normal.
fn check_status(status: Option<String>, message: Option<String>) -> Result<(), ServiceError> {
    match status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
        Some(other) => Err(ServiceError::Api {
            api: "google",
            status: other.to_string(),
            message: message.unwrap_or_default(),
        }),
    }
}

/// Error payloads may omit the result array, so it is only required once the status is fine.
fn required<T>(url: &str, field: &'static str, value: Option<T>) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::Parse {
        url: url.to_string(),
        source: serde::de::Error::missing_field(field),
    })
}

impl LocationService {
    pub fn new(api_key: ApiKey, http: Arc<dyn HttpClient>) -> Self {
        Self { api_key, http, base_url: GOOGLE_MAPS_API.to_string() }
    }

    /// Point the service at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Resolve a free-text place name to the coordinates of its first geocoding result.
    pub async fn get_coordinates(&self, location: &str) -> Result<GeoLocation, ServiceError> {
        let url = self.endpoint("geocode/json");
        let body = self
            .http
            .get(&url, &[("address", location), ("key", self.api_key.as_str())])
            .await?;

        let parsed: GeocodeResponse = parse_json(&url, &body)?;
        check_status(parsed.status, parsed.error_message)?;

        let first = required(&url, "results", parsed.results)?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::LocationNotFound { location: location.to_string() })?;

        let geo = GeoLocation::new(first.geometry.location.lat, first.geometry.location.lng);
        tracing::debug!(location, %geo, "geocoded location");
        Ok(geo)
    }

    /// Text-search for hiking trails within [`SEARCH_RADIUS_METERS`] of `geo`.
    ///
    /// Results keep the API's order. Missing `rating` / `user_ratings_total` become `-1`.
    pub async fn find_nearby_hiking_spots(
        &self,
        geo: GeoLocation,
        location: &str,
    ) -> Result<Vec<HikingSpot>, ServiceError> {
        let url = self.endpoint("place/textsearch/json");
        let query = format!("{HIKING_QUERY} {location}");
        let point = geo.to_string();
        let radius = SEARCH_RADIUS_METERS.to_string();

        let body = self
            .http
            .get(
                &url,
                &[
                    ("query", query.as_str()),
                    ("location", point.as_str()),
                    ("radius", radius.as_str()),
                    ("key", self.api_key.as_str()),
                ],
            )
            .await?;

        let parsed: PlacesResponse = parse_json(&url, &body)?;
        check_status(parsed.status, parsed.error_message)?;

        let spots: Vec<HikingSpot> = required(&url, "results", parsed.results)?
            .into_iter()
            .map(|place| {
                HikingSpot::new(
                    place.name,
                    place.geometry.location.lat,
                    place.geometry.location.lng,
                    place.rating,
                    place.user_ratings_total,
                )
            })
            .collect();

        tracing::info!(location, count = spots.len(), "found hiking spots");
        Ok(spots)
    }

    /// Geocode `location`, then search around it.
    pub async fn search_hiking_spots(&self, location: &str) -> Result<Vec<HikingSpot>, ServiceError> {
        let geo = self.get_coordinates(location).await?;
        self.find_nearby_hiking_spots(geo, location).await
    }

    /// Autocomplete descriptions for a partial place name, in response order.
    pub async fn suggest_locations(&self, input: &str) -> Result<Vec<String>, ServiceError> {
        let url = self.endpoint("place/autocomplete/json");
        let body = self
            .http
            .get(&url, &[("input", input), ("key", self.api_key.as_str())])
            .await?;

        let parsed: AutocompleteResponse = parse_json(&url, &body)?;
        check_status(parsed.status, parsed.error_message)?;

        let predictions = required(&url, "predictions", parsed.predictions)?;
        Ok(predictions.into_iter().map(|p| p.description).collect())
    }
}
