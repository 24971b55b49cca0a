//! Settings Persistence
//!
//! Provides persistent CLI settings with:
//! - Atomic file writes (temp file + rename)
//! - Defaults for missing or invalid fields
//! - An advisory lock against concurrent writers
//!
//! Storage location: {config_dir}/settings.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fsutil::{with_lock, write_atomic};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "settings.json.lock";

/// CLI settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Export settings
    #[serde(default)]
    pub export: ExportSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            general: GeneralSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl Settings {
    /// Repairs invalid values so persisted settings are always usable.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        if self.general.default_session_file.trim().is_empty() {
            self.general.default_session_file = default_session_file();
        }
        if self.export.default_file_name.trim().is_empty() {
            self.export.default_file_name = default_export_file_name();
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    /// Whether a new session has already been seeded with the example captions
    #[serde(default)]
    pub has_seeded_examples: bool,

    /// Session file used when `--session` is not given
    #[serde(default = "default_session_file")]
    pub default_session_file: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            has_seeded_examples: false,
            default_session_file: default_session_file(),
        }
    }
}

fn default_session_file() -> String {
    "captions.session.json".to_string()
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Output file used when `export -o` is not given
    #[serde(default = "default_export_file_name")]
    pub default_file_name: String,

    /// Refuse to export a session without captions
    #[serde(default = "default_true")]
    pub refuse_empty: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_file_name: default_export_file_name(),
            refuse_empty: true,
        }
    }
}

fn default_export_file_name() -> String {
    "captions.vtt".to_string()
}

fn default_true() -> bool {
    true
}

/// Settings manager for loading, saving, and resetting settings
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager for the given config directory
    pub fn new(config_dir: &Path) -> Self {
        Self {
            settings_path: config_dir.join(SETTINGS_FILE),
        }
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or unreadable
    pub fn load(&self) -> Settings {
        // Read-only commands must not create the config directory.
        if !self.settings_path.exists() {
            info!("Settings file not found, using defaults");
            return Settings::default();
        }

        let result = with_lock(&self.lock_path(), false, || {
            let content = fs::read_to_string(&self.settings_path)
                .context("Failed to read settings file")?;
            let mut settings = serde_json::from_str::<Settings>(&content)
                .context("Failed to parse settings file")?;

            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {:#}", e);
                Settings::default()
            }
        }
    }

    /// Save settings to disk using atomic write
    pub fn save(&self, settings: &Settings) -> Result<Settings> {
        with_lock(&self.lock_path(), true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            let content = serde_json::to_string_pretty(&normalized)
                .context("Failed to serialize settings")?;
            write_atomic(&self.settings_path, content.as_bytes())?;

            info!("Settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> Result<Settings> {
        with_lock(&self.lock_path(), true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)
                    .context("Failed to delete settings file")?;
                info!("Settings file deleted");
            }
            Ok(Settings::default())
        })
    }
}
