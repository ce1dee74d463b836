//! JSON configuration for the CPU cores and logging.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change:
//!
//! ```json
//! {
//!   "cpu": { "decimal_mode": true },
//!   "log": { "level": "warn", "interrupts": "debug" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::{LogCategory, LogConfig, LogLevel};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Behavior switches for a 6502 core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Honor the D flag in ADC/SBC (NMOS BCD). Off matches the NES 2A03,
    /// which has the decimal circuitry disconnected.
    pub decimal_mode: bool,
    /// Decode the stable undocumented opcodes. When off they are illegal.
    pub unofficial_opcodes: bool,
    /// Log every executed instruction at Cpu/Trace.
    pub trace: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            decimal_mode: false,
            unofficial_opcodes: true,
            trace: false,
        }
    }
}

/// Logging levels and output, applied to the global [`LogConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Level for categories without an override
    pub level: LogLevel,
    pub cpu: Option<LogLevel>,
    pub interrupts: Option<LogLevel>,
    pub decode: Option<LogLevel>,
    /// Maximum messages per second per category
    pub rate_limit: Option<usize>,
    /// Append to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Off,
            cpu: None,
            interrupts: None,
            decode: None,
            rate_limit: None,
            file: None,
        }
    }
}

impl LogSettings {
    /// Push these settings into `config`.
    pub fn apply_to(&self, config: &LogConfig) -> Result<(), ConfigError> {
        config.set_global_level(self.level);
        for (category, level) in [
            (LogCategory::Cpu, self.cpu),
            (LogCategory::Interrupts, self.interrupts),
            (LogCategory::Decode, self.decode),
        ] {
            config.set_level(category, level.unwrap_or(LogLevel::Off));
        }
        if let Some(limit) = self.rate_limit {
            config.set_rate_limit(limit);
        }
        match &self.file {
            Some(path) => config
                .set_log_file(path.clone())
                .map_err(|source| ConfigError::LogFile {
                    path: path.clone(),
                    source,
                })?,
            None => config.clear_log_file(),
        }
        Ok(())
    }

    /// Apply to the process-wide logging configuration.
    pub fn apply(&self) -> Result<(), ConfigError> {
        self.apply_to(LogConfig::global())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub cpu: CpuConfig,
    pub log: LogSettings,
}

impl CoreConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a config file. A missing file is an error; missing keys are not.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
