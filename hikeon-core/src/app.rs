//! Front-end neutral wiring: build the services from config and route user commands.

use anyhow::Result;
use std::sync::Arc;

use crate::{
    Config,
    chatbot::ChatbotService,
    controller::{ChatbotController, LocationController, WeatherController},
    http::{HttpClient, ReqwestHttpClient},
    location::LocationService,
    provider::default_provider_from_config,
    task::SingleFlight,
    weather::WeatherService,
};

/// A user action, as produced by whatever front end is driving the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchWeather { location: String },
    FindHikingTrails { location: String },
    SuggestLocations { input: String },
}

/// Routes commands to controllers, one [`SingleFlight`] per input field.
#[derive(Debug)]
pub struct Dispatcher {
    weather: Arc<WeatherController>,
    location: Arc<LocationController>,
    weather_flight: SingleFlight,
    trails_flight: SingleFlight,
    suggest_flight: SingleFlight,
}

impl Dispatcher {
    pub fn new(weather: WeatherController, location: LocationController) -> Self {
        Self {
            weather: Arc::new(weather),
            location: Arc::new(location),
            weather_flight: SingleFlight::new(),
            trails_flight: SingleFlight::new(),
            suggest_flight: SingleFlight::new(),
        }
    }

    /// Display text for `command`, or `None` if a newer command on the same field replaced it.
    pub async fn dispatch(&self, command: Command) -> Option<Result<String>> {
        tracing::debug!(?command, "dispatching");

        match command {
            Command::FetchWeather { location } => {
                let weather = self.weather.clone();
                self.weather_flight
                    .run(async move { weather.formatted_weather(&location).await })
                    .await
            }
            Command::FindHikingTrails { location } => {
                let controller = self.location.clone();
                self.trails_flight
                    .run(async move { controller.hiking_trails(&location).await })
                    .await
            }
            Command::SuggestLocations { input } => {
                let controller = self.location.clone();
                self.suggest_flight
                    .run(async move { controller.suggestions(&input).await })
                    .await
            }
        }
    }
}

/// Everything the interactive front end needs, built once at startup.
#[derive(Debug)]
pub struct App {
    pub dispatcher: Dispatcher,
    pub chatbot: ChatbotService,
}

impl App {
    /// Fails if the Google key, weather provider or chatbot endpoint is not configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_http(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http(config: &Config, http: Arc<dyn HttpClient>) -> Result<Self> {
        Self::with_env(config, http, |name| std::env::var(name).ok())
    }

    /// Like [`App::with_http`], reading environment fallbacks through `env`.
    pub fn with_env(
        config: &Config,
        http: Arc<dyn HttpClient>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let google_key = config.google_api_key_with(&env)?;
        let provider = default_provider_from_config(config, http.clone())?;
        let endpoint = config.chatbot_endpoint_with(&env)?;

        let dispatcher = Dispatcher::new(
            WeatherController::new(WeatherService::new(provider)),
            LocationController::new(LocationService::new(google_key, http.clone())),
        );

        Ok(Self { dispatcher, chatbot: ChatbotService::new(endpoint, http) })
    }

    /// A chat controller with a freshly started session.
    pub fn new_chat(&self) -> ChatbotController {
        let mut controller = ChatbotController::new(self.chatbot.clone());
        controller.start_chat_session(self.chatbot.start_session());
        controller
    }
}
