//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use wl_core::HolidayList;
use wl_tempo::{
    DEFAULT_API_URL, DEFAULT_ATTRIBUTE_KEY, DEFAULT_DESCRIPTION, TempoClient, WorklogSettings,
};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Tempo REST API.
    pub api_url: String,

    /// Tempo API token (bearer).
    pub api_token: Option<String>,

    /// Account the worklogs are booked for.
    pub account_id: Option<String>,

    /// Time of day every worklog starts at.
    pub start_time: NaiveTime,

    /// Worklog attribute key carrying the activity.
    pub attribute_key: String,

    /// Worklog description; `{ticket}` and `{activity}` are substituted.
    pub description: String,

    /// Weekdays that are not working days.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("account_id", &self.account_id)
            .field("start_time", &self.start_time)
            .field("attribute_key", &self.attribute_key)
            .field("description", &self.description)
            .field("holidays", &self.holidays.len())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let defaults = WorklogSettings::new("");
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            account_id: None,
            start_time: defaults.start_time,
            attribute_key: DEFAULT_ATTRIBUTE_KEY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            holidays: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WL_*)
        figment = figment.merge(Env::prefixed("WL_"));

        figment.extract()
    }

    /// Calendar excluding the configured holidays.
    pub fn calendar(&self) -> HolidayList {
        HolidayList::new(self.holidays.iter().copied())
    }

    /// Per-worklog settings; requires `account_id`.
    pub fn worklog_settings(&self) -> Result<WorklogSettings> {
        let account_id = self
            .account_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .context("account_id is not configured (set it in config.toml or WL_ACCOUNT_ID)")?;
        Ok(WorklogSettings {
            account_id: account_id.to_string(),
            start_time: self.start_time,
            attribute_key: self.attribute_key.clone(),
            description: self.description.clone(),
        })
    }

    /// Tempo client for the configured URL; requires `api_token`.
    pub fn tempo_client(&self) -> Result<TempoClient> {
        let token = self
            .api_token
            .as_deref()
            .context("api_token is not configured (set it in config.toml or WL_API_TOKEN)")?;
        TempoClient::new(token, &self.api_url).context("failed to create Tempo client")
    }
}

/// Returns the platform-specific config directory for wl.
///
/// On Linux: `~/.config/wl`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wl"))
}
