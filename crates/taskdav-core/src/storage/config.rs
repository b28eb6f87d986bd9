//! Sync configuration.
//!
//! Stores:
//! - Whether remote sync is enabled at all
//! - Remote calendar collection URL and Basic credentials
//! - Completed-task handling
//! - Sweep pacing and interval
//!
//! The configuration is persisted inside the state blob next to the task
//! mapping, see [`super::state`]. Settings files for `import` are TOML.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Lower bound on the spacing between remote requests during a sweep.
pub const MIN_REQUEST_SPACING_MS: u64 = 300;

const REDACTED: &str = "********";

/// Basic-auth credential pair sent with every remote request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Sync configuration.
///
/// Owned by the settings collaborator. The core never edits it in place;
/// a changed config replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Collection URL; resources live at `<url>/<resource-id>.ics`.
    #[serde(default)]
    pub remote_base_url: String,
    #[serde(default)]
    pub credentials: Credentials,
    /// Remove the remote event once its task is completed.
    #[serde(default)]
    pub delete_completed_tasks: bool,
    #[serde(default = "default_request_spacing_ms")]
    pub request_spacing_ms: u64,
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,
}

fn default_request_spacing_ms() -> u64 {
    MIN_REQUEST_SPACING_MS
}
fn default_sweep_interval_minutes() -> u64 {
    15
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            remote_base_url: String::new(),
            credentials: Credentials::default(),
            delete_completed_tasks: false,
            request_spacing_ms: default_request_spacing_ms(),
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

impl SyncConfig {
    /// Spacing between sweep requests, never below [`MIN_REQUEST_SPACING_MS`].
    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms.max(MIN_REQUEST_SPACING_MS))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.max(1).saturating_mul(60))
    }

    /// Parsed collection URL, normalised to end with `/` so resource names
    /// join underneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn collection_url(&self) -> Result<Url, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "remote_base_url".into(),
            message,
        };

        let mut url = Url::parse(self.remote_base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Check the fields that matter when sync is enabled.
    ///
    /// A disabled config is always valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        self.collection_url()?;
        if self.credentials.username.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "credentials.username".into(),
                message: "must not be empty when sync is enabled".into(),
            });
        }
        Ok(())
    }

    /// Parse a TOML settings document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Read a TOML settings file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                        .into(),
                ),
                serde_json::Value::Object(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// The password is always reported redacted.
    pub fn get(&self, key: &str) -> Option<String> {
        if key == "credentials.password" {
            return Some(REDACTED.to_string());
        }
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Return a copy with one dot-separated key changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let mut json =
            serde_json::to_value(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// JSON view for display, with the password redacted.
    pub fn to_redacted_json(&self) -> serde_json::Value {
        let mut json = serde_json::to_value(self).unwrap_or_default();
        if let Some(creds) = json.get_mut("credentials").and_then(|c| c.as_object_mut()) {
            creds.insert("password".into(), REDACTED.into());
        }
        json
    }
}
