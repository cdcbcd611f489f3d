//! Configuration for historystore

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the history store directory
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tutor")
        .join("history")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("tutor").join("history.yml")),
            Some(PathBuf::from("history.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_path_is_set() {
        let config = Config::default();
        assert!(config.store_path.ends_with("tutor/history") || config.store_path == PathBuf::from("./tutor/history"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("history.yml");
        std::fs::write(&config_path, "store_path: /tmp/hs-test\n").unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/hs-test"));
    }
}
