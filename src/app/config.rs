use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_API_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONFIG_FILE: &str = "taskdeck.toml";
const DEFAULT_LOG_FILE: &str = "taskdeck.log";

/// Client configuration, read from a TOML file with `TASKDECK_*` environment
/// overrides on top. Every field has a default so a partial file is fine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the hosted backend.
    pub api_url: String,
    /// Project API key sent with every request.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Where log output goes; the terminal itself belongs to the UI.
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> AppConfig {
        AppConfig {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    // Load from the given path, or from ./taskdeck.toml when it exists,
    // falling back to defaults. An explicit path that cannot be read is an error;
    // a missing implicit one is not.
    pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    let raw = fs::read_to_string(default_path)
                        .with_context(|| format!("failed to read {DEFAULT_CONFIG_FILE}"))?;
                    toml::from_str(&raw)
                        .with_context(|| format!("failed to parse {DEFAULT_CONFIG_FILE}"))?
                } else {
                    AppConfig::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TASKDECK_API_URL") {
            self.api_url = url;
        }
        if let Ok(key) = std::env::var("TASKDECK_API_KEY") {
            self.api_key = key;
        }
    }
}
