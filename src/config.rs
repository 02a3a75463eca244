use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "news_dashboard.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub profile: ProfileConfig,
    pub ui: UiConfig,
    pub articles: ArticlesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Scrapes can take minutes, so this is generous.
    pub timeout_secs: u64,
}

/// Behavior that differs between the full and the reduced dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub auto_refresh: bool,
    pub auto_refresh_interval_secs: u64,
    pub numbered_shortcuts: bool,
    pub reload_after_update: bool,
    pub reload_delay_ms: u64,
    pub command_aliases: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub notification_ttl_ms: u64,
    pub click_effect_ms: u64,
    pub clipboard_failure: ClipboardFailure,
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticlesConfig {
    pub path: Option<PathBuf>,
}

/// What a failed clipboard write does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardFailure {
    #[default]
    Silent,
    Notify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Auto-refresh, numbered shortcuts, reload after update, command aliases.
    Full,
    /// Only the core update/stats/filter/export behavior.
    Reduced,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 300,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self::preset(Profile::Full)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ttl_ms: 5000,
            click_effect_ms: 150,
            clipboard_failure: ClipboardFailure::Silent,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ProfileConfig {
    pub fn preset(profile: Profile) -> Self {
        let full = profile == Profile::Full;
        Self {
            auto_refresh: full,
            auto_refresh_interval_secs: 5 * 60,
            numbered_shortcuts: full,
            reload_after_update: full,
            reload_delay_ms: 2000,
            command_aliases: full,
        }
    }

    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        (self.auto_refresh && self.auto_refresh_interval_secs > 0)
            .then(|| Duration::from_secs(self.auto_refresh_interval_secs))
    }

    pub fn reload_delay(&self) -> Option<Duration> {
        self.reload_after_update
            .then(|| Duration::from_millis(self.reload_delay_ms))
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl UiConfig {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn click_effect(&self) -> Duration {
        Duration::from_millis(self.click_effect_ms)
    }
}

impl AppConfig {
    /// Loads `path` when given. Otherwise loads `news_dashboard.toml` from the
    /// working directory, writing the defaults there on first run.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => Self::load(),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_or_create(Path::new(CONFIG_FILE))
    }

    fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::read(path)
        } else {
            let config = Self::default();
            let content = toml::to_string_pretty(&config)?;
            if let Err(e) = fs::write(path, content) {
                tracing::warn!(path = %path.display(), error = %e, "could not write default config");
            }
            Ok(config)
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn apply_profile(&mut self, profile: Profile) {
        self.profile = ProfileConfig::preset(profile);
    }
}
