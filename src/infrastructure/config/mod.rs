//! Configuration management

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;
use crate::application::messaging::RouterOptions;
use crate::domain::text_safety::TextKind;

/// Host configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RouterConfig {
    pub report_errors: bool,
    /// Text kind name bounding replies, e.g. "content" or "description"
    pub reply_kind: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            report_errors: true,
            reply_kind: "content".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                name: "multibot".to_string(),
            },
            logging: LoggingConfig::default(),
            router: RouterConfig::default(),
            bots: vec![BotConfig {
                name: "console".to_string(),
                enabled: true,
            }],
        }
    }
}

/// Parses a comma-separated bot list. Blank and repeated names are skipped.
fn bots_from_list(list: &str) -> Vec<BotConfig> {
    let mut seen = HashSet::new();
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(|name| BotConfig {
            name: name.to_string(),
            enabled: true,
        })
        .collect()
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, overridden by MULTIBOT_BOTS (comma-separated names) and MULTIBOT_LOG
    pub fn load_env() -> Self {
        let mut config = Config::default();

        if let Ok(bots) = std::env::var("MULTIBOT_BOTS") {
            let bots = bots_from_list(&bots);
            if !bots.is_empty() {
                config.bots = bots;
            }
        }

        if let Ok(filter) = std::env::var("MULTIBOT_LOG") {
            config.logging.filter = filter;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for bot in &self.bots {
            if bot.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue("bot name cannot be empty".to_string()));
            }
            if !seen.insert(bot.name.as_str()) {
                return Err(ConfigError::InvalidValue(format!("duplicate bot name: {}", bot.name)));
            }
        }
        self.reply_kind()?;
        Ok(())
    }

    pub fn reply_kind(&self) -> Result<TextKind, ConfigError> {
        TextKind::from_name(&self.router.reply_kind)
            .ok_or_else(|| ConfigError::InvalidValue(format!("unknown reply kind: {}", self.router.reply_kind)))
    }

    pub fn router_options(&self) -> Result<RouterOptions, ConfigError> {
        Ok(RouterOptions {
            report_errors: self.router.report_errors,
            reply_kind: self.reply_kind()?,
        })
    }

    pub fn enabled_bots(&self) -> impl Iterator<Item = &BotConfig> {
        self.bots.iter().filter(|bot| bot.enabled)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
