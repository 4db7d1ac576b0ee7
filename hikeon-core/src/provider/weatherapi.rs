use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::ServiceError,
    http::{HttpClient, parse_json},
    model::Weather,
};

use super::{ProviderId, WeatherProvider, unix_to_utc};

const CURRENT_URL: &str = "http://api.weatherapi.com/v1/current.json";

/// WeatherAPI error code for "No matching location found."
const NO_MATCHING_LOCATION: u32 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, http: Arc<dyn HttpClient>) -> Self {
        Self { api_key, http }
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaError,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: u32,
}

fn is_unknown_location(body: &str) -> bool {
    serde_json::from_str::<WaErrorBody>(body)
        .map(|b| b.error.code == NO_MATCHING_LOCATION)
        .unwrap_or(false)
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn current_weather(&self, city: &str) -> Result<Option<Weather>, ServiceError> {
        let res = self.http.get(CURRENT_URL, &[("key", self.api_key.as_str()), ("q", city)]).await;

        let body = match res {
            Ok(body) => body,
            Err(ServiceError::Status { status: 400, ref body, .. }) if is_unknown_location(body) => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let parsed: WaResponse = parse_json(CURRENT_URL, &body)?;

        let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
        let observation_time = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        let location_name = format!("{}, {}", parsed.location.name, parsed.location.country);
        let wind_speed_mps = parsed.current.wind_kph / 3.6;

        Ok(Some(Weather {
            provider: self.id().to_string(),
            location_name,
            temperature_c: parsed.current.temp_c,
            feels_like_c: parsed.current.feelslike_c,
            condition: parsed.current.condition.text,
            humidity_pct: parsed.current.humidity,
            wind_speed_mps,
            observation_time,
        }))
    }
}
