use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::host::fs::expand_braces;

pub const CONFIG_FILE_NAME: &str = ".keylensrc.json";

/// The three recognized options of the annotation engine.
///
/// Loaded from `.keylensrc.json` by the CLI, or supplied directly by an
/// editor host. Every field has a default, so a missing or partial config
/// file is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Glob pattern used to discover translation sources. Supports `{a,b}`
    /// brace sets in addition to the usual wildcards.
    #[serde(default = "default_sources")]
    pub sources: String,
    /// Substring filter applied to matched file paths before loading.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Comma-separated list of recognized translation-function identifiers.
    #[serde(default = "default_functions")]
    pub functions: String,
}

fn default_sources() -> String {
    "locales/**/*.{json,js,ts}".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_functions() -> String {
    "t".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            locale: default_locale(),
            functions: default_functions(),
        }
    }
}

impl Settings {
    /// The configured translation-function names, trimmed, empty entries
    /// dropped.
    pub fn function_names(&self) -> Vec<String> {
        self.functions
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Validate configuration values.
    ///
    /// Returns an error if the source pattern is not a valid glob after
    /// brace-set expansion.
    pub fn validate(&self) -> Result<()> {
        for pattern in expand_braces(&self.sources) {
            Pattern::new(&pattern)
                .with_context(|| format!("Invalid glob pattern in 'sources': \"{}\"", pattern))?;
        }
        Ok(())
    }
}

pub fn default_settings_json() -> Result<String> {
    let settings = Settings::default();
    serde_json::to_string_pretty(&settings).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct SettingsLoadResult {
    pub settings: Settings,
    /// True if settings were loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_settings(start_dir: &Path) -> Result<SettingsLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let settings: Settings = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            settings.validate()?;
            Ok(SettingsLoadResult {
                settings,
                from_file: true,
            })
        }
        None => Ok(SettingsLoadResult {
            settings: Settings::default(),
            from_file: false,
        }),
    }
}
