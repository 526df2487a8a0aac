//! Bridge and engine configuration.
//!
//! Loaded from JSON, with environment overrides for the values a host
//! normally injects at build or launch time (licence key, API URL).

use crate::errors::BridgeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the capture licence key.
pub const ENV_LICENSE_KEY: &str = "MISNAP_LICENSE_KEY";
/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "HOOYU_API_URL";
/// Environment variable overriding the request timeout (seconds).
pub const ENV_REQUEST_TIMEOUT: &str = "MIVIP_REQUEST_TIMEOUT_SECS";

/// Font overrides handed to the engine UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    pub regular: Option<String>,
    pub light: Option<String>,
    pub medium: Option<String>,
    pub semi_bold: Option<String>,
    pub bold: Option<String>,
    pub heavy: Option<String>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            regular: Some("WorkSans-Regular".to_string()),
            light: None,
            medium: None,
            semi_bold: None,
            bold: None,
            heavy: None,
        }
    }
}

/// Presentation settings applied to the engine once, at bridge construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Silence capture sounds.
    pub sounds_disabled: bool,
    /// Allow the engine to reuse a completed request.
    pub reusable_enabled: bool,
    /// Disable engine-side logging.
    pub log_disabled: bool,
    pub fonts: FontSettings,
    /// URL the engine posts captured documents to, if any.
    pub document_callback_url: Option<String>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            sounds_disabled: true,
            reusable_enabled: false,
            log_disabled: false,
            fonts: FontSettings::default(),
            document_callback_url: None,
        }
    }
}

/// Top-level bridge configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Seconds a request may stay pending before it fails with a timeout.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub hub: HubSettings,

    /// Capture licence key. Usually injected through the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_base_url() -> String {
    "https://api.mivip.com".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout_secs(),
            hub: HubSettings::default(),
            license_key: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl BridgeConfig {
    /// Parse from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, BridgeError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BridgeError::InitFailed(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::InitFailed(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(self) -> Result<Self, BridgeError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_LICENSE_KEY).filter(|k| !k.trim().is_empty()) {
            self.license_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = secs.trim().parse().map_err(|_| {
                BridgeError::InitFailed(format!("{} must be a number of seconds", ENV_REQUEST_TIMEOUT))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.request_timeout_secs == 0 {
            return Err(BridgeError::InitFailed(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(BridgeError::InitFailed(format!(
                "API base URL must be http(s): {}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the licence key.
    pub fn with_license_key(mut self, key: impl Into<String>) -> Self {
        self.license_key = Some(key.into());
        self
    }

    /// Set the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
