use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    domain::DistrictId,
    errors::ConfigError,
    utils::{
        paths::PathResolver,
        persistence::{ensure_dir, read_json, write_json_atomic},
    },
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
/// Northern District of Illinois, the district new sessions are filed under
/// unless configured otherwise.
pub const DEFAULT_DISTRICT_ID: DistrictId = 1;

pub const API_URL_ENV: &str = "INTAKE_API_URL";
pub const AUTH_TOKEN_ENV: &str = "INTAKE_AUTH_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub district_id: DistrictId,
    /// Per-request timeout. Unset leaves the transport defaults in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub screen_reader_mode: bool,
    pub high_contrast_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            district_id: DEFAULT_DISTRICT_ID,
            request_timeout_secs: None,
            screen_reader_mode: false,
            high_contrast_mode: false,
        }
    }
}

impl Config {
    /// Applies `INTAKE_API_URL` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(API_URL_ENV) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.api_base_url = trimmed.to_string();
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got `{url}`"
            )));
        }
        if self.district_id <= 0 {
            return Err(ConfigError::Invalid(format!(
                "district_id must be positive, got {}",
                self.district_id
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] under the application directory.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    /// Reads the stored config (defaults when absent), then applies
    /// environment overrides and validates the result.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let stored: Option<Config> = read_json(&self.path)?;
        let config = stored.unwrap_or_default().with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        write_json_atomic(&self.path, config)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}
