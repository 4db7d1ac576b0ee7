use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use hikeon_core::{
    App, ChatbotController, ChatbotService, Config, LocationController, LocationService,
    ProviderId, ReqwestHttpClient, WeatherController, WeatherService,
    provider::default_provider_from_config,
};
use inquire::{Password, PasswordDisplayMode, Text};
use std::{path::PathBuf, sync::Arc};

use crate::interactive;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "hikeon", version, about = "HikeOn outdoor event planner")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, env = "HIKEON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log progress at info level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Without a subcommand the interactive app starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials and endpoints.
    Configure {
        #[command(subcommand)]
        target: ConfigureTarget,
    },

    /// Show current weather for a location.
    Weather {
        #[arg(required = true, num_args = 1..)]
        location: Vec<String>,
    },

    /// Find hiking trails within 50 km of a location.
    Trails {
        #[arg(required = true, num_args = 1..)]
        location: Vec<String>,
    },

    /// Suggest place names for a partial input.
    Suggest {
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,
    },

    /// Talk to the HikeOn AI assistant.
    Chat,

    /// Interactive menu with every feature.
    App,
}

#[derive(Debug, Subcommand)]
pub enum ConfigureTarget {
    /// Store the Google Geocoding/Places API key.
    Google,

    /// Store the API key for a weather provider.
    Weather {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: ProviderId,

        /// Make this provider the default even if another one is already set.
        #[arg(long)]
        default: bool,
    },

    /// Store the chatbot endpoint URL.
    Chatbot { endpoint: Option<String> },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let mut config = Config::load_from(&config_path)?;

        match self.command.unwrap_or(Command::App) {
            Command::Configure { target } => {
                configure(&mut config, target)?;
                config.save_to(&config_path)?;
                println!("Saved configuration to {}", config_path.display());
            }
            Command::Weather { location } => {
                let http = Arc::new(ReqwestHttpClient::new());
                let provider = default_provider_from_config(&config, http)?;
                let controller = WeatherController::new(WeatherService::new(provider));
                println!("{}", controller.formatted_weather(&location.join(" ")).await?);
            }
            Command::Trails { location } => {
                println!("{}", location_controller(&config)?.hiking_trails(&location.join(" ")).await?);
            }
            Command::Suggest { input } => {
                println!("{}", location_controller(&config)?.suggestions(&input.join(" ")).await?);
            }
            Command::Chat => {
                let service =
                    ChatbotService::new(config.chatbot_endpoint()?, Arc::new(ReqwestHttpClient::new()));
                let mut controller = ChatbotController::new(service.clone());
                controller.start_chat_session(service.start_session());
                interactive::chat(controller).await?;
            }
            Command::App => {
                let app = App::from_config(&config)
                    .context("HikeOn cannot start until it is fully configured")?;
                interactive::run(app).await?;
            }
        }

        Ok(())
    }
}

fn location_controller(config: &Config) -> anyhow::Result<LocationController> {
    let key = config.google_api_key()?;
    Ok(LocationController::new(LocationService::new(key, Arc::new(ReqwestHttpClient::new()))))
}

fn configure(config: &mut Config, target: ConfigureTarget) -> anyhow::Result<()> {
    match target {
        ConfigureTarget::Google => {
            let key = prompt_secret("Google API key:")?;
            config.set_google_api_key(key);
        }
        ConfigureTarget::Weather { provider, default } => {
            let key = prompt_secret(&format!("{} API key:", provider.display_name()))?;
            if store_provider_key(config, provider, key, default) {
                println!("Replaced the existing {} API key.", provider.display_name());
            }
        }
        ConfigureTarget::Chatbot { endpoint } => {
            let endpoint = match endpoint {
                Some(endpoint) => endpoint,
                None => Text::new("Chatbot endpoint URL:").prompt()?,
            };
            if endpoint.trim().is_empty() {
                bail!("Chatbot endpoint cannot be empty");
            }
            config.set_chatbot_endpoint(endpoint.trim().to_string());
        }
    }

    Ok(())
}

/// Returns true when a key for `id` was already configured.
fn store_provider_key(config: &mut Config, id: ProviderId, key: String, make_default: bool) -> bool {
    let replaced = config.is_provider_configured(id);
    config.upsert_provider_api_key(id, key);
    if make_default {
        config.set_default_provider(id);
    }

    tracing::info!(provider = %id, replaced, default = ?config.default_provider, "stored weather provider key");
    replaced
}

fn prompt_secret(message: &str) -> anyhow::Result<String> {
    let value = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;

    let value = value.trim();
    if value.is_empty() {
        bail!("API key cannot be empty");
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn multi_word_location_is_collected() {
        let cli = Cli::try_parse_from(["hikeon", "trails", "Mount", "Rainier"]).unwrap();

        match cli.command {
            Some(Command::Trails { location }) => assert_eq!(location.join(" "), "Mount Rainier"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_app() {
        let cli = Cli::try_parse_from(["hikeon", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn configure_chatbot_accepts_endpoint() {
        let cli =
            Cli::try_parse_from(["hikeon", "configure", "chatbot", "http://localhost:8000/chat"])
                .unwrap();
        let mut config = Config::default();

        match cli.command {
            Some(Command::Configure { target }) => configure(&mut config, target).unwrap(),
            other => panic!("unexpected command: {other:?}"),
        }

        assert_eq!(config.chatbot.endpoint.as_deref(), Some("http://localhost:8000/chat"));
    }

    #[test]
    fn configure_weather_parses_provider() {
        let cli = Cli::try_parse_from(["hikeon", "configure", "weather", "WeatherAPI", "--default"])
            .unwrap();

        match cli.command {
            Some(Command::Configure { target: ConfigureTarget::Weather { provider, default } }) => {
                assert_eq!(provider, ProviderId::WeatherApi);
                assert!(default);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["hikeon", "configure", "weather", "accuweather"]).is_err());
    }

    #[test]
    fn storing_provider_key_reports_replacement() {
        let mut config = Config::default();

        assert!(!store_provider_key(&mut config, ProviderId::OpenWeather, "A".into(), false));
        assert!(!store_provider_key(&mut config, ProviderId::WeatherApi, "B".into(), false));
        assert_eq!(config.default_provider_id().unwrap(), ProviderId::OpenWeather);

        assert!(store_provider_key(&mut config, ProviderId::WeatherApi, "C".into(), true));
        assert_eq!(config.provider_api_key(ProviderId::WeatherApi), Some("C"));
        assert_eq!(config.default_provider_id().unwrap(), ProviderId::WeatherApi);
    }

    #[test]
    fn weather_requires_location() {
        assert!(Cli::try_parse_from(["hikeon", "weather"]).is_err());
    }
}
