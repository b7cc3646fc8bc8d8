//! Configuration management
//!
//! Settings live in `settings.json` inside the config directory:
//! ```json
//! {
//!   "api": { "url": "https://newdev.smilebasicsource.com/api/", "authToken": "..." },
//!   ...
//! }
//! ```
//! Keys this crate does not manage are preserved on save. `SBS_API_URL` and
//! `SBS_AUTH_TOKEN` override the file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Content API used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://newdev.smilebasicsource.com/api/";

/// Environment variable overriding the API URL
pub const API_URL_ENV: &str = "SBS_API_URL";

/// Environment variable overriding the auth token
pub const AUTH_TOKEN_ENV: &str = "SBS_AUTH_TOKEN";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API root, always ending in `/`
    pub api_url: String,
    pub auth_token: Option<String>,
    /// Values taken from the environment at load time
    env: EnvOverrides,
}

/// Env values applied on load, remembered so `save` keeps them out of the file
#[derive(Debug, Clone, Default, PartialEq)]
struct EnvOverrides {
    api_url: Option<String>,
    auth_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, None)
    }
}

/// Validate an API URL and make sure it ends with `/`
pub fn normalize_api_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid API URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("API URL must be http or https: {}", raw);
    }

    let mut normalized = url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

impl Config {
    /// Config with no env overrides. `api_url` is taken as given.
    pub fn new(api_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            auth_token,
            env: EnvOverrides::default(),
        }
    }

    /// Load config from the config directory, then apply env overrides
    pub fn load(config_dir: &Path) -> Result<Self> {
        let raw = read_settings(config_dir)?;

        let env = EnvOverrides {
            api_url: match std::env::var(API_URL_ENV) {
                Ok(v) if !v.trim().is_empty() => Some(normalize_api_url(&v)?),
                _ => None,
            },
            auth_token: std::env::var(AUTH_TOKEN_ENV).ok().filter(|t| !t.is_empty()),
        };

        let api_url = match &env.api_url {
            Some(url) => url.clone(),
            None => normalize_api_url(raw.api.url.as_deref().unwrap_or(DEFAULT_API_URL))?,
        };
        let auth_token = env
            .auth_token
            .clone()
            .or(raw.api.auth_token)
            .filter(|t| !t.is_empty());

        Ok(Self {
            api_url,
            auth_token,
            env,
        })
    }

    /// Save config to the config directory
    /// Preserves other settings that this crate doesn't manage. A value still
    /// equal to its env override keeps whatever the file had.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let settings_path = config_dir.join("settings.json");
        let mut settings = read_settings(config_dir)?;

        if self.env.api_url.as_deref() != Some(self.api_url.as_str()) {
            settings.api.url = Some(self.api_url.clone());
        }
        if self.env.auth_token.is_none() || self.env.auth_token != self.auth_token {
            settings.api.auth_token = self.auth_token.clone();
        }

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {:?}", settings_path))?;
        Ok(())
    }
}

fn read_settings(config_dir: &Path) -> Result<SettingsFile> {
    let settings_path = config_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {:?}", settings_path))?;
    serde_json::from_str(&content).with_context(|| format!("Malformed {:?}", settings_path))
}
