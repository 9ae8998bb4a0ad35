//! Configuration loading and root folder resolution
//!
//! Two-tier configuration: a small TOML bootstrap file (root folder, port,
//! logging) plus CLI/environment overrides. Runtime data (the SQLite store)
//! lives inside the resolved root folder.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the SQLite store inside the root folder
pub const DATABASE_FILE: &str = "siteform.db";

/// Bootstrap configuration loaded from a TOML file
///
/// These settings cannot change during runtime; the service must restart to
/// pick up edits. Bootstrap concerns only.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Root folder for the SQLite store (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port (optional; the service applies its own default)
    #[serde(default)]
    pub port: Option<u16>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform path of the bootstrap config file for a module
///
/// Linux also honors `/etc/siteform/<module>.toml` as a system-wide fallback.
pub fn config_file_path(module: &str) -> Result<PathBuf> {
    let user_config = dirs::config_dir()
        .map(|d| d.join("siteform").join(format!("{}.toml", module)))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if user_config.exists() {
        return Ok(user_config);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/siteform").join(format!("{}.toml", module));
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    // Default to the user path even when absent; callers treat a missing
    // file as "no bootstrap config".
    Ok(user_config)
}

/// Load the bootstrap TOML config for a module
///
/// A missing file yields the defaults; a present-but-invalid file is a
/// configuration error.
pub fn load_toml_config(module: &str) -> Result<TomlConfig> {
    let path = config_file_path(module)?;
    load_toml_config_from(&path)
}

/// Load a bootstrap TOML config from an explicit path
pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(root) = &toml_config.root_folder {
        return root.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get the OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/siteform (or /var/lib/siteform for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("siteform"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/siteform"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/siteform
        dirs::data_dir()
            .map(|d| d.join("siteform"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/siteform"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\siteform
        dirs::data_local_dir()
            .map(|d| d.join("siteform"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\siteform"))
    } else {
        PathBuf::from("./siteform_data")
    }
}

/// Create the root folder if missing and return the database path inside it
pub fn prepare_root_folder(root: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root)?;
    Ok(root.join(DATABASE_FILE))
}
