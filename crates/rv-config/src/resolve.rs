//! Settings file resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path → defaults.

use std::path::{Path, PathBuf};

use crate::SETTINGS_FILENAME;

/// Where the settings file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A resolved settings location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPath {
    /// Path to the settings file (None means built-in defaults).
    pub path: Option<PathBuf>,
    /// How the path was chosen.
    pub source: ConfigSource,
}

/// Environment variable names.
const ENV_SETTINGS_PATH: &str = "RDBVIZ_CONFIG";
const ENV_CONFIG_DIR: &str = "RDBVIZ_CONFIG_DIR";

/// Application name for XDG directories.
const APP_NAME: &str = "rdbviz";

/// Resolve the settings file path using the standard resolution order.
///
/// 1. Explicit CLI path (returned even if missing, so loading reports it)
/// 2. RDBVIZ_CONFIG (direct file path, also returned even if missing)
/// 3. RDBVIZ_CONFIG_DIR + rdbviz.json, if it exists
/// 4. XDG config directory (~/.config/rdbviz/rdbviz.json), if it exists
/// 5. Built-in defaults (None)
pub fn resolve_settings_path(cli_path: Option<&Path>) -> SettingsPath {
    resolve_with(
        cli_path,
        std::env::var_os(ENV_SETTINGS_PATH).map(PathBuf::from),
        std::env::var_os(ENV_CONFIG_DIR).map(PathBuf::from),
        xdg_config_dir(),
    )
}

/// Resolution with every input supplied, so it can be tested without
/// touching process environment.
fn resolve_with(
    cli_path: Option<&Path>,
    env_file: Option<PathBuf>,
    env_dir: Option<PathBuf>,
    xdg_dir: Option<PathBuf>,
) -> SettingsPath {
    if let Some(path) = cli_path {
        return SettingsPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Some(path) = env_file {
        return SettingsPath {
            path: Some(path),
            source: ConfigSource::Environment,
        };
    }

    if let Some(dir) = env_dir {
        let path = dir.join(SETTINGS_FILENAME);
        if path.is_file() {
            return SettingsPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(dir) = xdg_dir {
        let path = dir.join(SETTINGS_FILENAME);
        if path.is_file() {
            return SettingsPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    SettingsPath::default()
}

/// Get the XDG config directory for rdbviz.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
