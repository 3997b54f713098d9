//! Server configuration.
//!
//! Configuration is layered: an optional TOML file (`clinica.toml` by
//! default), then `CLINICA`-prefixed environment variables, e.g.
//! `CLINICA__SERVER__PORT=9090` or `CLINICA__AUTH__SIGNING__SECRET=...`.

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use clinica_auth::AuthConfig;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "clinica.toml";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener settings.
    pub server: HttpConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Authentication settings.
    pub auth: AuthConfig,

    /// Development seed data.
    pub seed: SeedConfig,
}

impl ServerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be non-zero".to_string());
        }
        self.auth.validate().map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl HttpConfig {
    /// Returns the socket address string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Development seed data.
///
/// When a username and password are both set, an administrator account
/// is created at startup if the user store is empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed administrator username.
    pub admin_username: Option<String>,

    /// Seed administrator password.
    pub admin_password: Option<String>,
}

/// Loads configuration from an optional TOML file plus environment
/// overrides.
///
/// # Errors
///
/// Returns a description of the failure if the file is malformed, the
/// merged settings do not deserialize, or validation fails.
pub fn load_config(path: Option<&str>) -> Result<ServerConfig, String> {
    let mut builder = Config::builder();

    let path = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
    if path.exists() {
        builder = builder.add_source(File::from(path));
    }

    builder = builder.add_source(
        Environment::with_prefix("CLINICA")
            .try_parsing(true)
            .separator("__"),
    );

    let merged: ServerConfig = builder
        .build()
        .map_err(|e| format!("config build error: {e}"))?
        .try_deserialize()
        .map_err(|e| format!("config deserialize error: {e}"))?;

    merged.validate()?;
    Ok(merged)
}
