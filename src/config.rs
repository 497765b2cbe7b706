use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::credentials::{Credential, InMemoryCredentialStore};
use crate::error::CardhookError;
use crate::utils::get_env_with_prefix;

/// Main configuration for a cardhook server
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Partner credentials; secrets are never serialized back out
    #[serde(default)]
    pub credentials: Vec<CredentialConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Whole-request timeout; 0 disables it
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// One partner credential as configured: key id plus base64 secret
#[derive(Clone, Deserialize, Serialize)]
pub struct CredentialConfig {
    pub api_key_id: String,
    #[serde(skip_serializing)]
    pub shared_secret: String,
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("api_key_id", &self.api_key_id)
            .field("shared_secret", &"[REDACTED]")
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_request_timeout_seconds() -> u64 {
    10
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0).then(|| Duration::from_secs(self.request_timeout_seconds))
    }
}

impl Config {
    /// Build the credential store described by this configuration.
    ///
    /// # Errors
    ///
    /// Fails on the first credential whose key id is empty or whose secret
    /// is not valid, non-empty base64.
    pub fn credential_store(&self) -> crate::error::Result<InMemoryCredentialStore> {
        self.credentials
            .iter()
            .map(|c| Credential::new(c.api_key_id.clone(), &c.shared_secret))
            .collect::<Result<InMemoryCredentialStore, _>>()
            .map_err(CardhookError::from)
    }
}

/// Parse `key_id:base64secret` pairs separated by commas.
///
/// Base64 never contains `:` or `,`, so both work as separators. Entries
/// without a `:` are skipped with a warning.
pub fn parse_credentials(raw: &str) -> Vec<CredentialConfig> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.split_once(':') {
            Some((api_key_id, shared_secret)) => Some(CredentialConfig {
                api_key_id: api_key_id.trim().to_string(),
                shared_secret: shared_secret.trim().to_string(),
            }),
            None => {
                tracing::warn!("Ignoring credential entry without `key_id:secret` separator");
                None
            }
        })
        .collect()
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.server.request_timeout_seconds = timeout.as_secs();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Add a partner credential (base64 secret)
    pub fn with_credential(
        mut self,
        api_key_id: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Self {
        self.config.credentials.push(CredentialConfig {
            api_key_id: api_key_id.into(),
            shared_secret: shared_secret.into(),
        });
        self
    }

    /// Load configuration from environment variables with CARDHOOK_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = get_env_with_prefix("PORT") {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(max_body_size) = get_env_with_prefix("MAX_BODY_SIZE") {
            if let Ok(size) = max_body_size.parse() {
                self.config.server.max_body_size = size;
            }
        }
        if let Some(timeout) = get_env_with_prefix("REQUEST_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse() {
                self.config.server.request_timeout_seconds = seconds;
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(credentials) = get_env_with_prefix("CREDENTIALS") {
            self.config.credentials.extend(parse_credentials(&credentials));
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration is invalid:
    /// - Invalid server address (host:port) or port 0
    /// - Invalid log level
    /// - Zero maximum body size
    /// - A credential with an empty key id or an invalid base64 secret
    pub fn build(self) -> crate::error::Result<Config> {
        self.config.server.addr().map_err(|e| {
            CardhookError::config(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        if self.config.server.port == 0 {
            return Err(CardhookError::config("Server port must be greater than 0"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(CardhookError::config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.config.server.max_body_size == 0 {
            return Err(CardhookError::config(
                "Maximum body size must be greater than 0",
            ));
        }

        self.config.credential_store()?;

        if self.config.credentials.is_empty() {
            tracing::warn!("No partner credentials configured; every signed request will be rejected");
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
