//! Morphcalc Configuration
//!
//! Loads and saves the configuration from `~/.morphcalc/config.json`.
//! The file holds the API credential, so it is written with 0600
//! permissions inside a 0700 directory.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::types::{default_config, MorphConfig};

/// Config file name within the morphcalc directory.
const CONFIG_FILENAME: &str = "config.json";

/// Returns the morphcalc state directory: `~/.morphcalc`.
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/root"))
        .join(".morphcalc")
}

/// Returns the full path to the config file: `~/.morphcalc/config.json`.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILENAME)
}

/// Load the config from disk, merging missing fields with defaults.
///
/// Returns `None` if the config file does not exist or cannot be parsed.
pub fn load_config() -> Option<MorphConfig> {
    let config_path = get_config_path();
    if !config_path.exists() {
        return None;
    }

    let contents = fs::read_to_string(&config_path).ok()?;
    let mut config: MorphConfig = serde_json::from_str(&contents).ok()?;

    let defaults = default_config();
    if config.api_url.is_empty() {
        config.api_url = defaults.api_url;
    }
    if config.model.is_empty() {
        config.model = defaults.model;
    }
    if config.max_tokens == 0 {
        config.max_tokens = defaults.max_tokens;
    }

    Some(config)
}

/// Load the config, falling back to defaults when no file exists yet.
pub fn load_or_default() -> MorphConfig {
    load_config().unwrap_or_else(default_config)
}

/// Persist the config with restrictive permissions.
pub fn save_config(config: &MorphConfig) -> Result<()> {
    let dir = get_config_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir).context("Failed to create config directory")?;
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))?;
    }

    let config_path = get_config_path();
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, contents)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLevel;

    #[test]
    fn config_serializes_camel_case() {
        let config = default_config();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"apiUrl\""));
        assert!(json.contains("\"maxTokens\""));
        assert!(json.contains("\"logLevel\":\"info\""));
    }

    #[test]
    fn config_round_trips() {
        let mut config = default_config();
        config.api_key = "sk-test".to_string();
        config.log_level = LogLevel::Debug;

        let json = serde_json::to_string(&config).unwrap();
        let back: MorphConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_key, "sk-test");
        assert_eq!(back.log_level, LogLevel::Debug);
        assert_eq!(back.model, config.model);
    }
}
