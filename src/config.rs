//! Configuration for matter-storage

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matter-storage")
}

/// Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory holding the metadata documents and the blob store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How many days ahead the attention scan looks for upcoming due dates
    #[serde(default = "default_attention_window")]
    pub attention_window_days: i64,
}

fn default_attention_window() -> i64 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            attention_window_days: default_attention_window(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the Matter collection document path
    pub fn matters_path(&self) -> PathBuf {
        self.data_dir.join("matters.json")
    }

    /// Get the Template collection document path
    pub fn templates_path(&self) -> PathBuf {
        self.data_dir.join("templates.json")
    }

    /// Get blobs directory
    pub fn blobs_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    /// Get config file path
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }
}
