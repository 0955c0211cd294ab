//! Configuration loader
//!
//! Reads the TOML configuration from disk, or falls back to the copy of
//! mindlift.toml embedded at build time. Every loaded configuration is
//! validated before the control loop may start.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use mindlift_core::config::{ConfigError, ControlConfig};

/// Embedded default configuration (validated by build.rs)
pub const EMBEDDED_CONFIG: &str = include_str!("../../mindlift.toml");

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid control settings: {0}")]
    Control(ConfigError),
    #[error("invalid link settings: {0}")]
    Link(&'static str),
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Control(e)
    }
}

/// Robot and headset connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    /// Robot controller address
    pub robot_host: String,
    /// URScript secondary interface port
    pub secondary_port: u16,
    /// Modbus TCP server port
    pub modbus_port: u16,
    /// Modbus unit identifier
    pub modbus_unit_id: u8,
    /// ThinkGear connector address (host:port)
    pub headset_addr: String,
    /// Read/write timeout applied to robot sockets
    pub socket_timeout_ms: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            robot_host: "192.168.0.11".to_string(),
            secondary_port: 30002,
            modbus_port: 502,
            modbus_unit_id: 1,
            headset_addr: "127.0.0.1:13854".to_string(),
            socket_timeout_ms: 2000,
        }
    }
}

impl LinkSettings {
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.robot_host.trim().is_empty() {
            return Err(LoadError::Link("robot_host is empty"));
        }
        if self.headset_addr.trim().is_empty() {
            return Err(LoadError::Link("headset_addr is empty"));
        }
        if self.secondary_port == 0 || self.modbus_port == 0 {
            return Err(LoadError::Link("ports must be non-zero"));
        }
        if self.socket_timeout_ms == 0 {
            return Err(LoadError::Link("socket_timeout_ms must be positive"));
        }
        Ok(())
    }
}

/// Complete daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub link: LinkSettings,
    pub control: ControlConfig,
}

impl DaemonConfig {
    /// Validate link and control settings
    pub fn validate(&self) -> Result<(), LoadError> {
        self.link.validate()?;
        self.control.validate()?;
        Ok(())
    }
}

/// Parse and validate a TOML configuration
pub fn parse_config(text: &str) -> Result<DaemonConfig, LoadError> {
    let config: DaemonConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path`, or the embedded defaults when `None`
pub fn load_config(path: Option<&Path>) -> Result<DaemonConfig, LoadError> {
    let config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&text)?
        }
        None => {
            info!("using embedded configuration");
            parse_config(EMBEDDED_CONFIG)?
        }
    };

    log_config_summary(&config);
    Ok(config)
}

fn log_config_summary(config: &DaemonConfig) {
    let control = &config.control;
    let envelope = &control.envelope;
    debug!(
        robot = %config.link.robot_host,
        headset = %config.link.headset_addr,
        "link settings"
    );
    debug!(
        x = ?(envelope.min_x, envelope.max_x),
        y = ?(envelope.min_y, envelope.max_y),
        z = ?(envelope.min_z, envelope.max_z),
        "safety envelope (mm)"
    );
    debug!(
        threshold = control.threshold,
        blink_threshold = control.blink_threshold,
        interval_ms = control.command_interval_ms,
        watchdog_ms = control.watchdog_timeout_ms,
        "control settings"
    );
}
