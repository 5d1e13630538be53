use crate::core::package::{DEFAULT_BINARY_DEST, DEFAULT_DESTINATION, DEFAULT_TIMEOUT_SECS};
use crate::error::{FetchbinError, Result};
use crate::utils::fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Defaults applied to every install unless the command line overrides
/// them, persisted under `~/.fetchbin/config.json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub destination: PathBuf,
    pub binary_dest: PathBuf,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            destination: PathBuf::from(DEFAULT_DESTINATION),
            binary_dest: PathBuf::from(DEFAULT_BINARY_DEST),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::ensure_dir_exists(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}

fn fetchbin_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".fetchbin"))
        .ok_or(FetchbinError::HomeDirectoryNotFound)
}

fn config_path() -> Result<PathBuf> {
    Ok(fetchbin_dir()?.join("config.json"))
}
