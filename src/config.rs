//! Incident desk configuration.
//!
//! Loaded from `~/.incident-desk/config.toml`. Every key is optional and a
//! missing file means "all defaults".

use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Deserialize;

use crate::channels::{Channel, ChannelError, ChannelSelection};

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid channel config: {0}")]
    Channel(#[from] ChannelError),
}

/// Incident desk configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// How many mock incidents a session generates.
    pub incident_count: usize,

    /// Incidents per listing page.
    pub page_size: usize,

    /// Fixed seed for mock data. Random when unset.
    pub seed: Option<u64>,

    /// Linked from template drafts.
    pub status_page_url: String,

    /// Signs template drafts.
    pub team_name: String,

    pub drafting: DraftingConfig,

    /// Distribution channels, in display order.
    pub channels: Vec<ChannelConfig>,
}

/// Chat-completion settings for AI drafts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DraftingConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,

    /// Lowest-priority source for the key; see [`crate::credentials`].
    pub api_key: Option<String>,
}

/// One configured channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelConfig {
    pub name: String,

    #[serde(default)]
    pub subscribers: Option<u32>,

    /// Pre-selected when a session opens.
    #[serde(default)]
    pub default: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            incident_count: 50,
            page_size: 10,
            seed: None,
            status_page_url: "https://status.example.com".to_string(),
            team_name: "Incident Response Team".to_string(),
            drafting: DraftingConfig::default(),
            channels: ChannelSelection::standard()
                .available()
                .iter()
                .map(|c| ChannelConfig {
                    name: c.name.clone(),
                    subscribers: c.subscribers,
                    default: matches!(c.name.as_str(), "Status Page" | "Slack"),
                })
                .collect(),
        }
    }
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.perplexity.ai/chat/completions".to_string(),
            model: "sonar".to_string(),
            temperature: 0.5,
            max_tokens: 300,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl Config {
    /// Load config from `~/.incident-desk/config.toml`, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// The config file path: `~/.incident-desk/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".incident-desk").join("config.toml"))
    }

    /// A fresh channel selection with the configured defaults applied.
    ///
    /// Names are trimmed, matching how channels are looked up.
    pub fn channel_selection(&self) -> Result<ChannelSelection, ChannelError> {
        let available = self
            .channels
            .iter()
            .map(|c| Channel::new(c.name.trim(), c.subscribers))
            .collect();
        let defaults: Vec<&str> = self
            .channels
            .iter()
            .filter(|c| c.default)
            .map(|c| c.name.trim())
            .collect();
        ChannelSelection::new(available, defaults.as_slice())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page-size must be at least 1".into()));
        }
        if self.incident_count == 0 {
            return Err(ConfigError::Invalid(
                "incident-count must be at least 1".into(),
            ));
        }
        if self.drafting.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "drafting timeout-secs must be at least 1".into(),
            ));
        }
        if self.channels.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[channels]] entry is required".into(),
            ));
        }
        for (i, channel) in self.channels.iter().enumerate() {
            if channel.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "channel #{} has an empty name",
                    i + 1
                )));
            }
            let name = channel.name.trim();
            if self.channels[..i].iter().any(|c| c.name.trim() == name) {
                return Err(ConfigError::Invalid(format!(
                    "channel '{name}' is listed twice"
                )));
            }
        }
        self.channel_selection()?;
        Ok(())
    }
}
