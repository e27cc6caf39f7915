//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::domain::entities::RepeatLimits;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub telegram: TelegramConfig,
    pub chats: ChatsConfig,
    pub repeat: RepeatConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    /// Command prefixes; the first one is shown in help texts
    pub prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    /// Long-poll timeout in seconds
    pub poll_timeout: u64,
}

/// Chat access control
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChatsConfig {
    /// Chats the bot answers in; empty means all
    pub allowed: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RepeatConfig {
    pub max_count: u32,
    /// Unset means no cap on repetitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_repeat: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HistoryConfig {
    /// Observed messages kept per chat
    pub capacity: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "repeater-bot".to_string(),
            prefixes: vec!["/".to_string(), ".".to_string()],
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            poll_timeout: 30,
        }
    }
}

impl Default for RepeatConfig {
    fn default() -> Self {
        let limits = RepeatLimits::default();
        Self {
            max_count: limits.max_count,
            max_repeat: limits.max_repeat,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

impl RepeatConfig {
    pub fn limits(&self) -> RepeatLimits {
        RepeatLimits {
            max_count: self.max_count,
            max_repeat: self.max_repeat,
        }
    }
}

/// Parse a comma separated list of chat ids, skipping blanks and junk
pub fn parse_chat_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        Config::default().apply_env()
    }

    /// Overlay environment variables on top of this config
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = var("BOT_TOKEN").filter(|t| !t.is_empty()) {
            self.telegram.token = Some(token);
        }

        if let Some(name) = var("BOT_NAME").filter(|n| !n.is_empty()) {
            self.bot.name = name;
        }

        if let Some(prefixes) = var("BOT_PREFIXES") {
            let prefixes: Vec<String> = prefixes
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if !prefixes.is_empty() {
                self.bot.prefixes = prefixes;
            }
        }

        if let Some(ids) = var("ALLOWED_CHAT_IDS") {
            self.chats.allowed = parse_chat_ids(&ids);
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefixes.iter().all(|p| p.is_empty()) {
            return Err(ConfigError::MissingField("bot.prefixes".to_string()));
        }
        if self.repeat.max_count == 0 || self.repeat.max_repeat == Some(0) {
            return Err(ConfigError::InvalidValue("repeat limits must be positive".to_string()));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::InvalidValue("history.capacity must be positive".to_string()));
        }
        Ok(())
    }
}
