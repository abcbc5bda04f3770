use crate::resources::{CONFIG_DOCUMENT_PATH, LANGUAGE_TABLE_PATH};
use anyhow::{bail, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Resource bundle
    pub resource_dir: PathBuf,
    pub config_document: String,
    pub language_table: String,

    // Preferences
    pub preferences_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            // Resource bundle
            resource_dir: env_or("LOCALE_CONFIG_RESOURCE_DIR", "resources").into(),
            config_document: env_or("LOCALE_CONFIG_DOCUMENT", CONFIG_DOCUMENT_PATH),
            language_table: env_or("LOCALE_CONFIG_LANGUAGE_TABLE", LANGUAGE_TABLE_PATH),

            // Preferences
            preferences_path: env_or("LOCALE_CONFIG_PREFERENCES_PATH", "data/preferences.json")
                .into(),
        };

        if config.config_document == config.language_table {
            bail!(
                "LOCALE_CONFIG_DOCUMENT and LOCALE_CONFIG_LANGUAGE_TABLE both point to '{}'",
                config.config_document
            );
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("resources"),
            config_document: CONFIG_DOCUMENT_PATH.to_string(),
            language_table: LANGUAGE_TABLE_PATH.to_string(),
            preferences_path: PathBuf::from("data/preferences.json"),
        }
    }
}

/// Read an environment variable, treating unset and blank the same.
fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
