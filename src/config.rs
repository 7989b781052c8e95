// src/config.rs
use crate::listing::{ListingQuery, SortBy, SortOrder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const API_BASE_ENV: &str = "CIDTUI_API_BASE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub realtime_interval_secs: u64,
    pub analytics_days: u32,
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub visibility: Visibility,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 60,
            realtime_interval_secs: 30,
            analytics_days: 30,
            show_hidden: false,
            sort_by: SortBy::Name,
            sort_order: SortOrder::Ascending,
            visibility: Visibility::Public,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cidtui").join("config.toml"))
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Default location, then environment override.
    pub fn load() -> crate::Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Config::default(),
        };
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base = base;
            }
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn realtime_interval(&self) -> Duration {
        Duration::from_secs(self.realtime_interval_secs.max(1))
    }

    pub fn listing_query(&self) -> ListingQuery {
        ListingQuery {
            search: String::new(),
            show_hidden: self.show_hidden,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}
