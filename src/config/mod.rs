//! Configuration loading and tracing setup

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Page size limits applied to every paged query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

/// Where audit events go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Structured `tracing` events under the `audit` target
    #[default]
    Tracing,
    /// Kept in memory, for tests
    Memory,
    /// Published on a broadcast channel
    Broadcast,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub sink: AuditSinkKind,

    /// Capacity of the broadcast channel
    pub channel_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: AuditSinkKind::Tracing,
            channel_capacity: 1024,
        }
    }
}

/// Resource naming override for one record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOverride {
    /// Simple name of the record type, e.g. `Enclosure`
    pub type_name: String,

    #[serde(default)]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub base_action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Complete configuration of a keeper host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    pub pagination: PaginationConfig,
    pub audit: AuditConfig,
    pub resources: Vec<ResourceOverride>,
    pub logging: LoggingConfig,
}

impl KeeperConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if pagination.max_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_size".to_string(),
                value: pagination.max_size.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if pagination.default_size == 0 || pagination.default_size > pagination.max_size {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_size".to_string(),
                value: pagination.default_size.to_string(),
                message: format!("must be between 1 and {}", pagination.max_size),
            });
        }
        if self.audit.sink == AuditSinkKind::Broadcast && self.audit.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audit.channel_capacity".to_string(),
                value: "0".to_string(),
                message: "a broadcast channel needs capacity".to_string(),
            });
        }
        Ok(())
    }
}

/// Install the global `tracing` subscriber
///
/// Does nothing when a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
