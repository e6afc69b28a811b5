//! Reader configuration from YAML

use crate::core::registry::MAX_TELESCOPE_ID;
use crate::error::{EventIoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options shared by the library readers and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderConfig {
    /// Only keep data of these telescopes (all telescopes when absent)
    #[serde(default)]
    pub allowed_telescopes: Option<BTreeSet<u32>>,

    /// Drop calibration events while assembling events
    #[serde(default)]
    pub skip_calibration: bool,

    /// Maximum nesting depth printed by `print-structure`
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Show a spinner while scanning files
    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_progress() -> bool {
    true
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            allowed_telescopes: None,
            skip_calibration: false,
            max_depth: None,
            progress: default_progress(),
        }
    }
}

impl ReaderConfig {
    /// Load reader configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse reader configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ReaderConfig =
            serde_yaml::from_str(yaml).map_err(|e| EventIoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default location: `<config dir>/eventio/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("eventio").join("config.yaml"))
    }

    /// Load from `path` if given, else from the default location if that
    /// file exists, else fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(telescopes) = &self.allowed_telescopes {
            if telescopes.is_empty() {
                return Err(EventIoError::Config(
                    "allowed_telescopes must not be empty".to_string(),
                ));
            }
            if let Some(id) = telescopes.iter().find(|id| **id > MAX_TELESCOPE_ID) {
                return Err(EventIoError::Config(format!(
                    "telescope id {} is out of range (0..={})",
                    id, MAX_TELESCOPE_ID
                )));
            }
        }
        Ok(())
    }
}
