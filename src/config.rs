use crate::debugger::dialect::DialectKind;
use crate::errors::ConfigError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "sdb.json";

/// Persistent debugger settings, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub command_dialect: DialectKind,
    pub log_path: Option<PathBuf>,
    pub target_latency_ms: u64,
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            command_dialect: DialectKind::Sdb,
            log_path: None,
            target_latency_ms: 25,
        }
    }
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Configuration, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads `path`, falling back to defaults when it is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Configuration {
        match Configuration::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(ref error)) if error.kind() == io::ErrorKind::NotFound => {
                Configuration::default()
            }
            Err(error) => {
                warn!("ignoring configuration {}: {}", path.display(), error);
                Configuration::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn target_latency(&self) -> Duration {
        Duration::from_millis(self.target_latency_ms)
    }
}
