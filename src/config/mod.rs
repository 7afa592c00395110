//! Configuration management for Skazka

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::llm::auth::API_KEY_ENV;
use crate::llm::models::DEFAULT_API_VERSION;
use crate::llm::{ApiKeyManager, AzureOpenAiClient, BridgeClient, ModelGateway};
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::story::{CefrLevel, LengthBucket};
use crate::theme::Theme;
use crate::tutor::TutorOptions;

const ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
const DEPLOYMENT_ENV: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
const API_VERSION_ENV: &str = "AZURE_OPENAI_API_VERSION";
const BRIDGE_URL_ENV: &str = "SKAZKA_BRIDGE_URL";

/// How requests reach the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Straight to an Azure OpenAI deployment
    #[default]
    Direct,
    /// Through an HTTP relay exposing `/api/llm`
    Bridge,
}

/// Where the story and answers are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    /// Forgotten on exit
    Memory,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transport: Transport,

    /// Azure OpenAI resource endpoint, e.g. `https://example.openai.azure.com`
    pub endpoint: Option<String>,

    /// Deployment name; falls back to the model hint, then `gpt-4o`
    pub deployment: Option<String>,

    pub api_version: String,

    /// Base URL of the relay when using [`Transport::Bridge`]
    pub bridge_url: Option<String>,

    /// Model name passed with every request
    pub model_hint: Option<String>,

    pub storage: StorageBackend,

    /// Language stories are written in
    pub language: String,

    pub default_level: CefrLevel,
    pub default_length: LengthBucket,

    /// Built-in palette name, see [`Theme::NAMES`]
    pub theme: String,

    /// Custom theme overrides (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// Vim mode enabled
    pub vim_mode: bool,

    /// API key taken from the environment; never written to disk
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: Transport::Direct,
            endpoint: None,
            deployment: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            bridge_url: None,
            model_hint: None,
            storage: StorageBackend::File,
            language: "Russian".to_string(),
            default_level: CefrLevel::default(),
            default_length: LengthBucket::default(),
            theme: "Tokyo Night".to_string(),
            custom_theme: None,
            vim_mode: true,
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    ///
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config: Self = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")?
        } else {
            let config = Self::default();
            config.save()?;
            config
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Override fields from environment variables found by `lookup`
    ///
    /// Setting a bridge URL also selects the bridge transport.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(deployment) = lookup(DEPLOYMENT_ENV) {
            self.deployment = Some(deployment);
        }
        if let Some(version) = lookup(API_VERSION_ENV) {
            self.api_version = version;
        }
        if let Some(url) = lookup(BRIDGE_URL_ENV) {
            self.bridge_url = Some(url);
            self.transport = Transport::Bridge;
        }
        self.api_key = lookup(API_KEY_ENV);
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "skazka").context("Failed to determine project directories")
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Get the path of the on-disk store
    pub fn store_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("store.json"))
    }

    /// Get the path of the log file used while the TUI is running
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("skazka.log"))
    }

    /// Get the active theme
    ///
    /// A custom palette wins over the named one; an unknown name falls back
    /// to Tokyo Night.
    pub fn active_theme(&self) -> Theme {
        if let Some(custom) = &self.custom_theme {
            return custom.clone();
        }
        Theme::named(&self.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.theme, known = ?Theme::NAMES, "Unknown theme, using default");
            Theme::tokyo_night()
        })
    }

    /// Tutor settings derived from this config
    pub fn tutor_options(&self) -> TutorOptions {
        TutorOptions {
            language: self.language.clone(),
            model_hint: self.model_hint.clone().filter(|m| !m.trim().is_empty()),
            level: self.default_level,
            length: self.default_length,
        }
    }

    /// Open the configured store
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(match self.storage {
            StorageBackend::File => Arc::new(FileStore::new(Self::store_path()?)),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        })
    }

    /// Build the configured gateway
    ///
    /// The direct transport needs an endpoint and an API key; the bridge
    /// needs its base URL.
    pub fn build_gateway(&self) -> Result<Arc<dyn ModelGateway>> {
        match self.transport {
            Transport::Direct => {
                let endpoint = self.endpoint.as_deref().context(
                    "No Azure OpenAI endpoint configured. Set AZURE_OPENAI_ENDPOINT or `endpoint` in config.json",
                )?;
                let api_key = ApiKeyManager::resolve(self.api_key.clone()).with_context(|| {
                    format!("No API key available. Set {} or run `skazka key set`", API_KEY_ENV)
                })?;
                let client = AzureOpenAiClient::new(
                    endpoint,
                    api_key,
                    self.deployment.clone(),
                    self.api_version.clone(),
                )
                .context("Failed to create Azure OpenAI client")?;
                Ok(Arc::new(client))
            }
            Transport::Bridge => {
                let url = self.bridge_url.as_deref().context(
                    "No bridge URL configured. Set SKAZKA_BRIDGE_URL or `bridge_url` in config.json",
                )?;
                let client = BridgeClient::new(url).context("Failed to create bridge client")?;
                Ok(Arc::new(client))
            }
        }
    }
}
