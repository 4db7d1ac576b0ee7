use crate::{
    Config,
    error::ServiceError,
    http::HttpClient,
    model::Weather,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{fmt::Debug, str::FromStr, sync::Arc};

pub mod openweather;
pub mod weatherapi;

/// Weather backends HikeOn can talk to. Parsed case-insensitively from the config and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenWeather, ProviderId::WeatherApi];

    /// Key used in `[providers.<key>]` and `default_provider`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    /// Name shown in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OpenWeather",
            ProviderId::WeatherApi => "WeatherAPI.com",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = ProviderId::ALL.iter().map(ProviderId::as_str).collect();
                anyhow::anyhow!("Unknown weather provider '{value}'. Supported: {}.", known.join(", "))
            })
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Current conditions for `city`, or `None` when the provider does not know the place.
    async fn current_weather(&self, city: &str) -> Result<Option<Weather>, ServiceError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    http: Arc<dyn HttpClient>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `hikeon configure weather {id}` and enter your API key."
        )
    })?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::new(api_key.to_owned(), http)),
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::new(api_key.to_owned(), http)),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(
    config: &Config,
    http: Arc<dyn HttpClient>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config, http)
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
