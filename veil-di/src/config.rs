//! veil-di configuration
//!
//! Resolved once at startup from CLI → ENV → TOML → compiled defaults
//! using the shared helpers in `veil_common::config`.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use veil_common::config::{load_toml_config, resolve_config_path, resolve_setting, LoggingConfig};
use veil_common::{Error, Result};

/// Module name, also the TOML file stem (`veil-di.toml`)
pub const MODULE_NAME: &str = "veil-di";

pub const DEFAULT_PORT: u16 = 5731;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

pub const ENV_PORT: &str = "VEIL_DI_PORT";
pub const ENV_CONFIG: &str = "VEIL_DI_CONFIG";
pub const ENV_BIND_ADDRESS: &str = "VEIL_DI_BIND_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "VEIL_LOG_LEVEL";

/// Level used until the configuration has been read
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Tracing filter directives for the service crates at `level`
pub fn log_directives(level: &str) -> String {
    format!(
        "veil_di={level},veil_common={level},tower_http=info",
        level = level
    )
}

/// Upload gate tuning (`[upload]` table)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadSettings {
    /// Delay between simulated progress ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Percentage added per tick
    #[serde(default = "default_progress_step")]
    pub progress_step: u8,

    /// Pause between the last file completing and `on_all_uploaded`
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Files larger than this are rejected
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Lowercase extensions without the dot
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    /// Start the workflow as soon as a batch fully uploads
    #[serde(default = "default_auto_start_workflow")]
    pub auto_start_workflow: bool,
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_progress_step() -> u8 {
    10
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_max_file_size_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_accepted_extensions() -> Vec<String> {
    ["pdf", "doc", "docx", "txt", "csv"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_auto_start_workflow() -> bool {
    true
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            progress_step: default_progress_step(),
            settle_delay_ms: default_settle_delay_ms(),
            max_file_size_bytes: default_max_file_size_bytes(),
            accepted_extensions: default_accepted_extensions(),
            auto_start_workflow: default_auto_start_workflow(),
        }
    }
}

impl UploadSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Whether `extension` (without the dot, any case) is accepted
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Reject settings the upload gate cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(Error::Config(format!(
                "upload.progress_step must be within 1..=100 (got {})",
                self.progress_step
            )));
        }
        if self.accepted_extensions.is_empty() {
            return Err(Error::Config(
                "upload.accepted_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// QA review tuning (`[qa]` table)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QaSettings {
    /// Simulated duration of an automated reprocess
    #[serde(default = "default_reprocess_delay_ms")]
    pub reprocess_delay_ms: u64,
}

fn default_reprocess_delay_ms() -> u64 {
    3000
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            reprocess_delay_ms: default_reprocess_delay_ms(),
        }
    }
}

impl QaSettings {
    pub fn reprocess_delay(&self) -> Duration {
        Duration::from_millis(self.reprocess_delay_ms)
    }
}

/// TOML file layout
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub qa: QaSettings,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub upload: UploadSettings,
    pub qa: QaSettings,
    /// TOML file the settings were read from; `None` when no file was found
    pub config_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            log_level: LoggingConfig::default().level,
            upload: UploadSettings::default(),
            qa: QaSettings::default(),
            config_path: None,
        }
    }
}

impl ServiceConfig {
    /// Resolve every setting from CLI, environment, TOML and defaults
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let config_path = resolve_config_path(cli.config.as_deref(), ENV_CONFIG, MODULE_NAME);
        let toml: TomlConfig = load_toml_config(config_path.as_deref())?;
        toml.upload.validate()?;

        let port = resolve_setting(cli.port, ENV_PORT, toml.port, DEFAULT_PORT);
        let bind_address = resolve_setting(
            cli.bind_address.clone(),
            ENV_BIND_ADDRESS,
            toml.bind_address,
            DEFAULT_BIND_ADDRESS.to_string(),
        );
        let log_level = resolve_setting(
            cli.log_level.clone(),
            ENV_LOG_LEVEL,
            Some(toml.logging.level),
            LoggingConfig::default().level,
        );

        Ok(Self {
            bind_address,
            port,
            log_level,
            upload: toml.upload,
            qa: toml.qa,
            config_path: config_path.filter(|path| path.is_file()),
        })
    }

    /// `address:port` for the TCP listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
