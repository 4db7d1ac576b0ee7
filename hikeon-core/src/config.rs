use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{error::ServiceError, provider::ProviderId};

/// Entry name looked up in the Google key file.
pub const GOOGLE_KEY_FILE_ENTRY: &str = "Google_API_KEY";
pub const GOOGLE_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const CHATBOT_URL_ENV: &str = "HIKEON_CHATBOT_URL";

/// Configuration for a single weather provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Google Geocoding/Places credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleConfig {
    pub api_key: Option<String>,

    /// dotenv-style file holding a `Google_API_KEY=...` entry.
    pub key_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatbotConfig {
    pub endpoint: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default weather provider id, e.g. "openweather" or "weatherapi".
    pub default_provider: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub chatbot: ChatbotConfig,
}

/// A non-blank API key. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ServiceError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ServiceError::MissingCredential("API key is empty".into()));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Config {
    /// Return the default weather provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        let s = self.default_provider.as_ref().ok_or_else(|| {
            anyhow!(
                "No default weather provider configured.\n\
                 Hint: run `hikeon configure weather <provider>` (e.g. `hikeon configure weather openweather`) first."
            )
        })?;

        s.parse()
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Load config from `path`, or an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Default path to the config file, in the platform config directory.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "hikeon", "hikeon")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace a provider API key and optionally set default provider.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    pub fn set_google_api_key(&mut self, api_key: String) {
        self.google.api_key = Some(api_key);
    }

    pub fn set_chatbot_endpoint(&mut self, endpoint: String) {
        self.chatbot.endpoint = Some(endpoint);
    }

    /// Resolve the Google key: inline config, then the key file, then `GOOGLE_API_KEY`.
    pub fn google_api_key(&self) -> Result<ApiKey> {
        self.google_api_key_with(|name| std::env::var(name).ok())
    }

    pub fn google_api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<ApiKey> {
        if let Some(key) = non_blank(self.google.api_key.as_deref()) {
            return Ok(ApiKey::new(key)?);
        }

        if let Some(path) = &self.google.key_file {
            if let Some(key) = read_key_file(path)? {
                return Ok(ApiKey::new(key)?);
            }
        }

        if let Some(key) = non_blank(env(GOOGLE_KEY_ENV).as_deref()) {
            return Ok(ApiKey::new(key)?);
        }

        Err(ServiceError::MissingCredential(format!(
            "Google API key not found in config, key file ({GOOGLE_KEY_FILE_ENTRY}) or ${GOOGLE_KEY_ENV}.\n\
             Hint: run `hikeon configure google` and enter your API key."
        ))
        .into())
    }

    pub fn chatbot_endpoint(&self) -> Result<String> {
        self.chatbot_endpoint_with(|name| std::env::var(name).ok())
    }

    pub fn chatbot_endpoint_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<String> {
        non_blank(self.chatbot.endpoint.as_deref())
            .map(str::to_string)
            .or_else(|| env(CHATBOT_URL_ENV).filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No chatbot endpoint configured.\n\
                     Hint: run `hikeon configure chatbot <url>` or set ${CHATBOT_URL_ENV}."
                )
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn read_key_file(path: &Path) -> Result<Option<String>> {
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open key file: {}", path.display()))?;

    for entry in entries {
        let (name, value) =
            entry.with_context(|| format!("Failed to parse key file: {}", path.display()))?;
        if name == GOOGLE_KEY_FILE_ENTRY && !value.trim().is_empty() {
            return Ok(Some(value));
        }
    }

    Ok(None)
}
