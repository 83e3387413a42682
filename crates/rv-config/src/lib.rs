//! rdbviz settings loading and validation.
//!
//! This crate provides:
//! - The typed [`AnalyzeSettings`] struct and its built-in defaults
//! - Settings file resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Settings snapshots for run provenance

pub mod duration;
pub mod resolve;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use duration::{format_duration, parse_duration};
pub use resolve::{resolve_settings_path, ConfigSource, SettingsPath};
pub use settings::{AnalyzeSettings, PrefixSettings, SettingsOverrides};
pub use snapshot::ConfigSnapshot;
pub use validate::{lint_settings, validate_settings, ValidationError, ValidationResult};

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Settings file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in settings file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings resolution options.
#[derive(Debug, Default, Clone)]
pub struct SettingsOptions {
    /// Explicit settings file (highest priority).
    pub path: Option<PathBuf>,
    /// Per-field overrides from CLI flags, applied after the file.
    pub overrides: SettingsOverrides,
}

/// Settings with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    /// Effective settings after file load and overrides.
    pub settings: AnalyzeSettings,
    /// Where the settings file was found.
    pub source: ConfigSource,
    /// Path of the settings file (None when using defaults).
    pub path: Option<PathBuf>,
    /// SHA-256 of the settings file content (None when using defaults).
    pub content_hash: Option<String>,
}

impl ResolvedSettings {
    /// Create a snapshot for run provenance.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(
            &self.settings,
            &self.source,
            self.path.as_deref(),
            self.content_hash.clone(),
        )
    }
}

/// Default settings file name.
pub const SETTINGS_FILENAME: &str = "rdbviz.json";

/// Load settings with the standard resolution order.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit path (via SettingsOptions)
/// 2. RDBVIZ_CONFIG (file) and RDBVIZ_CONFIG_DIR (directory)
/// 3. XDG config home (~/.config/rdbviz/rdbviz.json)
/// 4. Built-in defaults
///
/// CLI overrides are applied on top and the result is validated.
pub fn load_settings(options: &SettingsOptions) -> Result<ResolvedSettings, ConfigError> {
    let located = resolve_settings_path(options.path.as_deref());

    let (mut settings, path, content_hash) = match located.path {
        Some(path) => {
            let (settings, hash) = load_settings_from_file(&path)?;
            (settings, Some(path), Some(hash))
        }
        None => (AnalyzeSettings::default(), None, None),
    };

    options.overrides.apply(&mut settings);
    validate_settings(&settings)?;

    Ok(ResolvedSettings {
        settings,
        source: located.source,
        path,
        content_hash,
    })
}

/// Load and parse a settings file, returning the settings and content hash.
pub fn load_settings_from_file(path: &Path) -> Result<(AnalyzeSettings, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let settings: AnalyzeSettings =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok((settings, compute_hash(&content)))
}

/// Compute the SHA-256 hex digest of settings content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
