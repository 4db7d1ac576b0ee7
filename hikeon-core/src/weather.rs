use crate::{error::ServiceError, model::Weather, provider::WeatherProvider};

/// Current-weather lookups through whichever provider the user configured.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// `Ok(None)` means the provider has no data for `city`.
    pub async fn get_current_weather(&self, city: &str) -> Result<Option<Weather>, ServiceError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ServiceError::InvalidInput("city name cannot be empty".into()));
        }

        let weather = self.provider.current_weather(city).await?;
        match &weather {
            Some(w) => tracing::info!(
                provider = %self.provider.id(),
                city,
                temperature_c = w.temperature_c,
                "fetched current weather"
            ),
            None => tracing::warn!(provider = %self.provider.id(), city, "no weather data found"),
        }

        Ok(weather)
    }
}
