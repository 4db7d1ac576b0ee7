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

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, http: Arc<dyn HttpClient>) -> Self {
        Self { api_key, http }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn current_weather(&self, city: &str) -> Result<Option<Weather>, ServiceError> {
        let res = self
            .http
            .get(
                CURRENT_URL,
                &[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")],
            )
            .await;

        let body = match res {
            Ok(body) => body,
            // OpenWeather answers an unknown city with 404 {"cod":"404","message":"city not found"}.
            Err(ServiceError::Status { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let parsed: OwCurrentResponse = parse_json(CURRENT_URL, &body)?;

        let observation_time = parsed.dt.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        let condition = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(Some(Weather {
            provider: self.id().to_string(),
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            condition,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            observation_time,
        }))
    }
}
