//! Configuration management for the `WorkToHome` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WorkToHomeError;
use crate::models::UserId;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure for the `WorkToHome` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkToHomeConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Storage backend settings
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Listing search defaults
    pub search: SearchConfig,
    /// Access tokens
    pub auth: AuthConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Fjall,
}

/// Storage backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend to use
    pub backend: StorageBackend,
    /// Database directory for the fjall backend
    pub path: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Listing search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius for nearby search when the request doesn't give one
    pub default_radius_miles: f64,
    /// Page size when the request doesn't give one
    pub default_per_page: u32,
    /// Largest page size a request may ask for
    pub max_per_page: u32,
}

/// Bearer tokens and the users they authenticate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: HashMap<String, UserId>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_storage_path() -> String {
    "~/.local/share/worktohome/db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_radius_miles() -> f64 {
    10.0
}

fn default_per_page() -> u32 {
    20
}

fn default_max_per_page() -> u32 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: default_storage_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_miles: default_radius_miles(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl StorageConfig {
    /// Storage path with a leading `~` resolved to the home directory
    #[must_use]
    pub fn expanded_path(&self) -> PathBuf {
        match self.path.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.path)),
            None => PathBuf::from(&self.path),
        }
    }
}

impl WorkToHomeConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let explicit = config_path.is_some();
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if explicit && !config_file.exists() {
            return Err(WorkToHomeError::config(format!(
                "Config file not found: {}",
                config_file.display()
            ))
            .into());
        }

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WORKTOHOME_SERVER__PORT=8080 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix("WORKTOHOME")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WorkToHomeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("worktohome").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.search.default_per_page == 0 {
            self.search.default_per_page = default_per_page();
        }
        if self.search.max_per_page == 0 {
            self.search.max_per_page = default_max_per_page();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tokens()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(WorkToHomeError::config("Server port cannot be 0").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(
                WorkToHomeError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        let radius = self.search.default_radius_miles;
        if !(radius > 0.0 && radius <= 500.0) {
            return Err(WorkToHomeError::config(
                "Default search radius must be greater than 0 and at most 500 miles",
            )
            .into());
        }

        if self.search.max_per_page > 500 {
            return Err(WorkToHomeError::config("Maximum page size cannot exceed 500").into());
        }

        if self.search.default_per_page > self.search.max_per_page {
            return Err(WorkToHomeError::config(format!(
                "Default page size {} exceeds maximum page size {}",
                self.search.default_per_page, self.search.max_per_page
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WorkToHomeError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WorkToHomeError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.storage.backend == StorageBackend::Fjall && self.storage.path.trim().is_empty() {
            return Err(WorkToHomeError::config("Fjall storage requires a path").into());
        }

        Ok(())
    }

    /// Validate configured access tokens
    fn validate_tokens(&self) -> Result<()> {
        if let Some(short) = self.auth.tokens.keys().find(|token| token.len() < 16) {
            return Err(WorkToHomeError::config(format!(
                "Access token '{}...' is too short; tokens need at least 16 characters",
                short.chars().take(4).collect::<String>()
            ))
            .into());
        }
        Ok(())
    }
}
