//! Configuration file discovery and loading
//!
//! Veil services resolve each setting in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file never prevents startup: the service logs a warning and
//! continues with compiled defaults. A TOML file that exists but cannot be
//! parsed is a configuration error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Directory name used under the platform config directory
pub const CONFIG_DIR_NAME: &str = "veil";

/// Logging configuration shared by all services
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locate the TOML config file for a module
///
/// Priority: explicit CLI path, then the path named by `env_var_name`, then the
/// platform default location. Returns `None` when no candidate exists.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    module_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform default location
    default_config_path(module_name)
}

/// Get the default configuration file path for the platform, if one exists
fn default_config_path(module_name: &str) -> Option<PathBuf> {
    let file_name = format!("{}.toml", module_name);

    let user_config = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(&file_name));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        // System-wide fallback: /etc/veil/<module>.toml
        let system_config = PathBuf::from("/etc").join(CONFIG_DIR_NAME).join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load a TOML config file into `T`
///
/// - `None` or a non-existent path yields `T::default()` with a warning
/// - An unreadable or malformed file yields `Error::Config`
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let path = match path {
        Some(path) => path,
        None => {
            warn!("No config file found, using compiled defaults");
            return Ok(T::default());
        }
    };

    if !path.exists() {
        warn!(
            "Config file not found: {} (using compiled defaults)",
            path.display()
        );
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve a single setting following CLI → ENV → TOML → default priority
///
/// Environment values that fail to parse are ignored with a warning.
pub fn resolve_setting<T>(
    cli_value: Option<T>,
    env_var_name: &str,
    toml_value: Option<T>,
    default: T,
) -> T
where
    T: FromStr,
{
    if let Some(value) = cli_value {
        return value;
    }

    if let Ok(raw) = std::env::var(env_var_name) {
        match raw.trim().parse::<T>() {
            Ok(value) => return value,
            Err(_) => warn!(
                "Ignoring {}={:?}: value could not be parsed",
                env_var_name, raw
            ),
        }
    }

    toml_value.unwrap_or(default)
}
