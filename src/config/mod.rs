use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Hard upper bound on files per merge request.
pub const DEFAULT_MAX_FILES: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            _ => None,
        }
    }

    /// `LOG_FORMAT=json` selects JSON lines; anything else is human-readable.
    ///
    /// Runs before the subscriber exists, so it cannot log. Unknown values
    /// are reported by [`Config::from_env`].
    pub fn from_env() -> Self {
        env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(LogFormat::Pretty)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_files: usize,
    pub max_upload_size_mb: usize,
    pub command_timeout_seconds: u64,
    pub temp_root: PathBuf,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            max_files: DEFAULT_MAX_FILES,
            max_upload_size_mb: 512,
            command_timeout_seconds: 120,
            temp_root: env::temp_dir(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let defaults = Config::default();

        if let Ok(raw) = env::var("LOG_FORMAT") {
            if LogFormat::parse(&raw).is_none() {
                warn!("Unknown LOG_FORMAT {:?}, using pretty", raw);
            }
        }

        // PORT wins over SERVER_PORT for platform compatibility
        let port_var = if env::var("PORT").is_ok() { "PORT" } else { "SERVER_PORT" };

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: {}", defaults.server_host);
                defaults.server_host.clone()
            }),
            server_port: Self::parse_env_var(port_var, defaults.server_port)
                .context("Failed to parse server port")?,
            max_files: Self::parse_env_var("MAX_FILES", defaults.max_files)
                .context("Failed to parse MAX_FILES")?,
            max_upload_size_mb: Self::parse_env_var("MAX_UPLOAD_SIZE_MB", defaults.max_upload_size_mb)
                .context("Failed to parse MAX_UPLOAD_SIZE_MB")?,
            command_timeout_seconds: Self::parse_env_var(
                "COMMAND_TIMEOUT_SECONDS",
                defaults.command_timeout_seconds,
            )
            .context("Failed to parse COMMAND_TIMEOUT_SECONDS")?,
            temp_root: env::var("TEMP_ROOT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_root),
            log_format: LogFormat::from_env(),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.trim().parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_files == 0 {
            return Err(anyhow::anyhow!("MAX_FILES must be greater than 0"));
        }
        if self.max_upload_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.command_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("COMMAND_TIMEOUT_SECONDS must be greater than 0"));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }
}
