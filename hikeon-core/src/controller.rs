//! UI-facing adapters: validate raw input, call a service, render display text.

use anyhow::Result;
use std::fmt::Write as _;

use crate::{
    chatbot::ChatbotService,
    location::LocationService,
    model::{HikingSpot, SessionId, Weather},
    weather::WeatherService,
};

pub const EMPTY_LOCATION: &str = "Please enter a location.";
pub const INVALID_MESSAGE: &str = "System: Please enter a valid message.\n";
pub const CHAT_ERROR: &str =
    "System: An error occurred while processing your request. Please try again.\n";

#[derive(Debug)]
pub struct WeatherController {
    service: WeatherService,
}

impl WeatherController {
    pub fn new(service: WeatherService) -> Self {
        Self { service }
    }

    pub async fn formatted_weather(&self, location: &str) -> Result<String> {
        let city = location.trim();
        if city.is_empty() {
            return Ok(EMPTY_LOCATION.to_string());
        }

        Ok(match self.service.get_current_weather(city).await? {
            Some(weather) => format_weather(&weather),
            None => format!("No weather data found for {city}."),
        })
    }
}

pub fn format_weather(w: &Weather) -> String {
    format!(
        "Weather in {}\n\
         Temperature: {:.1}°C (feels like {:.1}°C)\n\
         Condition: {}\n\
         Humidity: {}%\n\
         Wind: {:.1} m/s\n\
         Observed: {} via {}",
        w.location_name,
        w.temperature_c,
        w.feels_like_c,
        w.condition,
        w.humidity_pct,
        w.wind_speed_mps,
        w.observation_time.format("%Y-%m-%d %H:%M UTC"),
        w.provider,
    )
}

#[derive(Debug)]
pub struct LocationController {
    service: LocationService,
}

impl LocationController {
    pub fn new(service: LocationService) -> Self {
        Self { service }
    }

    pub async fn hiking_trails(&self, location: &str) -> Result<String> {
        let location = location.trim();
        if location.is_empty() {
            return Ok(EMPTY_LOCATION.to_string());
        }

        let spots = self.service.search_hiking_spots(location).await?;
        Ok(format_hiking_spots(location, &spots))
    }

    pub async fn suggestions(&self, input: &str) -> Result<String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(EMPTY_LOCATION.to_string());
        }

        let suggestions = self.service.suggest_locations(input).await?;
        if suggestions.is_empty() {
            return Ok(format!("No suggestions for {input}."));
        }
        Ok(suggestions.join("\n"))
    }
}

pub fn format_hiking_spots(location: &str, spots: &[HikingSpot]) -> String {
    if spots.is_empty() {
        return format!("No hiking trails found near {location}.");
    }

    let mut out = format!("Hiking trails near {location}:");
    for (i, spot) in spots.iter().enumerate() {
        let _ = write!(out, "\n{}. {} ({:.4}, {:.4})", i + 1, spot.name, spot.latitude, spot.longitude);
        match (spot.rating(), spot.total_ratings()) {
            (Some(rating), Some(count)) => {
                let _ = write!(out, " - rated {rating:.1} from {count} reviews");
            }
            (Some(rating), None) => {
                let _ = write!(out, " - rated {rating:.1}");
            }
            _ => out.push_str(" - no rating yet"),
        }
    }
    out
}

/// Owns the conversation shown to the user. Entries are only ever appended.
#[derive(Debug)]
pub struct ChatbotController {
    service: ChatbotService,
    session: Option<SessionId>,
    transcript: String,
}

impl ChatbotController {
    pub fn new(service: ChatbotService) -> Self {
        Self { service, session: None, transcript: String::new() }
    }

    pub fn start_chat_session(&mut self, session: SessionId) {
        tracing::info!(session = %session, "chat session started");
        self.session = Some(session);
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Sends `message` trimmed and returns the entry appended to the transcript.
    ///
    /// The transcript echoes the message as typed.
    pub async fn handle_user_message(&mut self, message: &str) -> String {
        let request = message.trim();
        let entry = if request.is_empty() {
            INVALID_MESSAGE.to_string()
        } else {
            let session = match self.session.clone() {
                Some(s) => s,
                None => {
                    let s = self.service.start_session();
                    self.start_chat_session(s.clone());
                    s
                }
            };

            match self.service.get_chatbot_response(&session, request).await {
                Ok(reply) => format!("User: {message}\nAI: {reply}\n"),
                Err(e) => {
                    tracing::error!(session = %session, error = %e, "chatbot request failed");
                    CHAT_ERROR.to_string()
                }
            }
        };

        self.transcript.push_str(&entry);
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ApiKey,
        error::ServiceError,
        http::testing::FakeHttpClient,
        provider::openweather::OpenWeatherProvider,
    };
    use rstest::rstest;
    use std::sync::Arc;

    const SEATTLE: &str = r#"{
        "name": "Seattle",
        "dt": 1700000000,
        "main": {"temp": 15.0, "feels_like": 13.4, "humidity": 81},
        "weather": [{"description": "light rain"}],
        "wind": {"speed": 3.6}
    }"#;

    fn weather_controller(fake: &Arc<FakeHttpClient>) -> WeatherController {
        let provider = OpenWeatherProvider::new("K".into(), fake.clone());
        WeatherController::new(WeatherService::new(Box::new(provider)))
    }

    fn location_controller(fake: &Arc<FakeHttpClient>) -> LocationController {
        LocationController::new(LocationService::new(ApiKey::new("G").unwrap(), fake.clone()))
    }

    fn chatbot_controller(fake: &Arc<FakeHttpClient>) -> ChatbotController {
        ChatbotController::new(ChatbotService::new("http://bot.test/chat", fake.clone()))
    }

    #[tokio::test]
    async fn weather_display_contains_city_and_temperature() {
        let fake = Arc::new(FakeHttpClient::new().with_body(SEATTLE));

        let text = weather_controller(&fake).formatted_weather("Seattle").await.unwrap();

        assert!(text.contains("Seattle"));
        assert!(text.contains("15"));
        assert!(text.contains("light rain"));
    }

    #[tokio::test]
    async fn weather_without_data_is_reported_inline() {
        let fake = Arc::new(FakeHttpClient::new().with_error(ServiceError::Status {
            url: "u".into(),
            status: 404,
            body: String::new(),
        }));

        let text = weather_controller(&fake).formatted_weather("Atlantis").await.unwrap();
        assert_eq!(text, "No weather data found for Atlantis.");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    #[tokio::test]
    async fn blank_weather_input_makes_no_request(#[case] input: &str) {
        let fake = Arc::new(FakeHttpClient::new());

        let text = weather_controller(&fake).formatted_weather(input).await.unwrap();

        assert_eq!(text, EMPTY_LOCATION);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn trails_are_listed_in_order() {
        let fake = Arc::new(
            FakeHttpClient::new()
                .with_body(r#"{"results":[{"geometry":{"location":{"lat":47.6,"lng":-122.3}}}]}"#)
                .with_body(
                    r#"{"results":[
                        {"name":"Discovery Park Loop","geometry":{"location":{"lat":47.657,"lng":-122.405}},"rating":4.7,"user_ratings_total":5321},
                        {"name":"Hidden Path","geometry":{"location":{"lat":47.5,"lng":-122.2}}}
                    ]}"#,
                ),
        );

        let text = location_controller(&fake).hiking_trails("Seattle").await.unwrap();

        assert_eq!(
            text,
            "Hiking trails near Seattle:\n\
             1. Discovery Park Loop (47.6570, -122.4050) - rated 4.7 from 5321 reviews\n\
             2. Hidden Path (47.5000, -122.2000) - no rating yet"
        );
    }

    #[tokio::test]
    async fn unknown_location_error_reaches_caller() {
        let fake = Arc::new(FakeHttpClient::new().with_body(r#"{"results":[]}"#));

        let err = location_controller(&fake).hiking_trails("Nowhere12345").await.unwrap_err();

        let service_err = err.downcast_ref::<ServiceError>().expect("service error");
        assert!(service_err.is_invalid_argument());
    }

    #[tokio::test]
    async fn suggestions_one_per_line() {
        let fake = Arc::new(FakeHttpClient::new().with_body(
            r#"{"predictions":[{"description":"Banff, AB, Canada"},{"description":"Banff, Scotland"}]}"#,
        ));

        let text = location_controller(&fake).suggestions("Banff").await.unwrap();
        assert_eq!(text, "Banff, AB, Canada\nBanff, Scotland");
    }

    #[test]
    fn empty_trail_list_message() {
        assert_eq!(format_hiking_spots("Antarctica", &[]), "No hiking trails found near Antarctica.");
    }

    #[rstest]
    #[case("")]
    #[case("    ")]
    #[tokio::test]
    async fn blank_chat_message_makes_no_request(#[case] input: &str) {
        let fake = Arc::new(FakeHttpClient::new());
        let mut controller = chatbot_controller(&fake);

        let entry = controller.handle_user_message(input).await;

        assert_eq!(entry, INVALID_MESSAGE);
        assert_eq!(controller.transcript(), INVALID_MESSAGE);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn chat_exchanges_are_appended() {
        let fake = Arc::new(
            FakeHttpClient::new()
                .with_body("Bring layers.")
                .with_error(ServiceError::Transport { url: "u".into(), source: "refused".into() }),
        );
        let mut controller = chatbot_controller(&fake);
        controller.start_chat_session(SessionId::new("s-1"));

        controller.handle_user_message("What should I pack?").await;
        let entry = controller.handle_user_message("And food?").await;

        assert_eq!(entry, CHAT_ERROR);
        assert_eq!(
            controller.transcript(),
            format!("User: What should I pack?\nAI: Bring layers.\n{CHAT_ERROR}")
        );

        let requests = fake.requests();
        assert!(requests.iter().all(|r| r.param("session_id") == Some("s-1")));
    }

    #[tokio::test]
    async fn transcript_echoes_message_as_typed() {
        let fake = Arc::new(FakeHttpClient::new().with_body("Hi there."));
        let mut controller = chatbot_controller(&fake);

        let entry = controller.handle_user_message("  hello  ").await;

        assert_eq!(entry, "User:   hello  \nAI: Hi there.\n");
        assert_eq!(fake.requests()[0].param("message"), Some("hello"));
    }

    #[tokio::test]
    async fn session_started_lazily() {
        let fake = Arc::new(FakeHttpClient::new().with_body("hi"));
        let mut controller = chatbot_controller(&fake);
        assert!(controller.session().is_none());

        controller.handle_user_message("hello").await;

        let session = controller.session().expect("session started").clone();
        assert_eq!(fake.requests()[0].param("session_id"), Some(session.as_str()));
    }
}
