//! Front-end configuration, stored as RON.
//!
//! A missing file means defaults. A file that cannot be read or parsed is
//! reported by [`load_config`]; [`load_or_default`] logs it and falls back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use classifier_core::SubmitPolicy;
use classifier_engine::{ClientSettings, DEFAULT_ENDPOINT};
use classifier_logging::{classifier_info, classifier_warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "url_classifier.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("failed to write config {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Overlap handling as spelled in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolicySetting {
    #[default]
    Supersede,
    RejectWhilePending,
    LastWriteWins,
}

impl From<PolicySetting> for SubmitPolicy {
    fn from(setting: PolicySetting) -> Self {
        match setting {
            PolicySetting::Supersede => SubmitPolicy::Supersede,
            PolicySetting::RejectWhilePending => SubmitPolicy::RejectWhilePending,
            PolicySetting::LastWriteWins => SubmitPolicy::LastWriteWins,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    /// `None` leaves requests without a deadline.
    pub request_timeout_ms: Option<u64>,
    pub max_response_bytes: u64,
    pub submit_policy: PolicySetting,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_ms: client.connect_timeout.as_millis() as u64,
            request_timeout_ms: client.request_timeout.map(|t| t.as_millis() as u64),
            max_response_bytes: client.max_response_bytes,
            submit_policy: PolicySetting::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            max_response_bytes: self.max_response_bytes,
        }
    }

    pub fn submit_policy(&self) -> SubmitPolicy {
        self.submit_policy.into()
    }
}

/// Load the config at `path`; `Ok(None)` when the file does not exist.
pub fn load_config(path: &Path) -> Result<Option<ClassifierConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

pub fn load_or_default(path: &Path) -> ClassifierConfig {
    match load_config(path) {
        Ok(Some(config)) => {
            classifier_info!("Loaded config from {:?}", path);
            config
        }
        Ok(None) => ClassifierConfig::default(),
        Err(err) => {
            classifier_warn!("{}; using defaults", err);
            ClassifierConfig::default()
        }
    }
}

pub fn save_config(path: &Path, config: &ClassifierConfig) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)
        .map_err(|err| ConfigError::Serialize(err.to_string()))?;
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
