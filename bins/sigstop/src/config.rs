use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sigstop_process::DEFAULT_PROC_ROOT;

/// Tool configuration, loaded from an optional YAML file.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigstopConfig {
    /// procfs root to discover processes under
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    /// Whether stop/resume propagate to descendants unless overridden
    #[serde(default)]
    pub include_children: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_proc_root() -> PathBuf {
    PathBuf::from(DEFAULT_PROC_ROOT)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SigstopConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
            include_children: false,
            log_level: default_log_level(),
        }
    }
}

impl SigstopConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::load_from_string(&content)
    }

    /// Load configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        // serde_yaml reads an empty document as unit, not as an empty map
        let config: SigstopConfig = if content.trim().is_empty() {
            SigstopConfig::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.proc_root.as_os_str().is_empty() {
            return Err(anyhow!("proc_root cannot be empty"));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(anyhow!(
                "Invalid log level: {}, must be one of: trace, debug, info, warn, error",
                self.log_level
            )),
        }
    }
}
