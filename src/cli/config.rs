// ABOUTME: Configuration management for keystone application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BUILD_FILE: &str = "keystone.build.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Build file used when a command is not given one
    #[serde(default = "default_build_file")]
    pub build_file: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_build_file() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_file: default_build_file(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env();
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = [
            PathBuf::from("keystone.yaml"),
            PathBuf::from("keystone.yml"),
            PathBuf::from(".keystone.yaml"),
            PathBuf::from(".keystone.yml"),
        ];

        for path in possible_paths {
            if path.exists() {
                return path;
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".keystone").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        // Default path (may not exist)
        PathBuf::from("keystone.yaml")
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) {
        if let Ok(level) = std::env::var("KEYSTONE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("KEYSTONE_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(build_file) = std::env::var("KEYSTONE_BUILD_FILE") {
            self.build_file = PathBuf::from(build_file);
        }
    }

    /// The build file to use, preferring one given on the command line.
    pub fn build_file(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| self.build_file.clone())
    }
}
