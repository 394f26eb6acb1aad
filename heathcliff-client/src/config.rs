//! Configuration loading for the HEATHCLIFF client.
//!
//! All fields are required unless explicitly marked optional.

use chrono::NaiveDate;
use heathcliff_core::{ReportWindow, RequestOverrides};
use heathcliff_reporting::{EntityAttribute, EntityGranularity, ReporterSettings};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api: ApiConfig,
    /// Optional; defaults apply when absent.
    #[serde(default)]
    pub reporter: ReporterSettings,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_version: String,
    pub certificate_path: PathBuf,
    pub key_path: PathBuf,
    pub request_timeout_ms: u64,
    /// Sweep only this organization. Optional.
    pub org_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Column allow-list for metric reports. Optional.
    pub columns: Option<Vec<String>>,
    /// Levels of the entity sweep. Optional, all levels when absent.
    pub granularities: Option<Vec<EntityGranularity>>,
    /// Attributes of the entity sweep. Optional, all attributes when absent.
    pub attributes: Option<Vec<EntityAttribute>>,
    /// Request body overrides for metric reports. Optional.
    #[serde(default)]
    pub overrides: RequestOverrides,
}

impl ReportConfig {
    pub fn window(&self) -> ReportWindow {
        ReportWindow::new(self.start_date, self.end_date)
    }
}

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "HEATHCLIFF_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or HEATHCLIFF_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    /// Read and validate the config at `path`, falling back to
    /// [`CONFIG_PATH_ENV`] when no path was given on the command line.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .ok_or(ConfigError::MissingConfigPath)?,
        };
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(invalid("api.base_url", "must not be empty"));
        }
        if self.api.api_version.trim().is_empty() {
            return Err(invalid("api.api_version", "must not be empty"));
        }
        if self.api.certificate_path.as_os_str().is_empty() {
            return Err(invalid("api.certificate_path", "must not be empty"));
        }
        if self.api.key_path.as_os_str().is_empty() {
            return Err(invalid("api.key_path", "must not be empty"));
        }
        if self.api.request_timeout_ms == 0 {
            return Err(invalid("api.request_timeout_ms", "must be > 0"));
        }
        if self.reporter.entity_page_limit == 0 {
            return Err(invalid("reporter.entity_page_limit", "must be > 0"));
        }
        if self.reporter.report_page_limit == 0 {
            return Err(invalid("reporter.report_page_limit", "must be > 0"));
        }
        if self.reporter.time_zone.trim().is_empty() {
            return Err(invalid("reporter.time_zone", "must not be empty"));
        }
        if self.report.end_date < self.report.start_date {
            return Err(invalid("report.end_date", "must be >= start_date"));
        }
        if matches!(&self.report.columns, Some(columns) if columns.is_empty()) {
            return Err(invalid("report.columns", "must not be empty when given"));
        }
        if matches!(&self.report.granularities, Some(levels) if levels.is_empty()) {
            return Err(invalid("report.granularities", "must not be empty when given"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}
