use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CheckError;

pub const TAUTULLI_URL_VAR: &str = "TAUTULLI_URL";
pub const TAUTULLI_APIKEY_VAR: &str = "TAUTULLI_APIKEY";

pub const DEFAULT_API_PATH: &str = "/api/v2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Appended to `TAUTULLI_URL`.
    pub api_path: String,
    /// Program and leading arguments for the kill script; forwarded
    /// arguments are appended after these.
    pub kill_command: Vec<String>,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            api_path: DEFAULT_API_PATH.to_string(),
            kill_command: vec!["python".to_string(), "kill_script.py".to_string()],
        }
    }
}

impl LimiterConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self, CheckError> {
        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            CheckError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: LimiterConfig = toml::from_str(&content).map_err(|e| {
            CheckError::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;

        if config.kill_command.is_empty() {
            return Err(CheckError::Configuration(format!(
                "{}: kill_command must name a program",
                path.display()
            )));
        }
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

/// Tautulli access, taken from the environment on every run.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: String,
    pub api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, CheckError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CheckError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        match (read(TAUTULLI_URL_VAR), read(TAUTULLI_APIKEY_VAR)) {
            (Some(base_url), Some(api_key)) => Ok(Self { base_url, api_key }),
            (url, key) => {
                let missing: Vec<&str> = [(TAUTULLI_URL_VAR, url.is_none()), (TAUTULLI_APIKEY_VAR, key.is_none())]
                    .into_iter()
                    .filter(|(_, absent)| *absent)
                    .map(|(name, _)| name)
                    .collect();
                Err(CheckError::Configuration(format!(
                    "Tautulli API key or URL is not set, missing {}",
                    missing.join(" and ")
                )))
            }
        }
    }
}
