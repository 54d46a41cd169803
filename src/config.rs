use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_HEARTBEAT_SECS: u64 = 10;
pub const DEFAULT_TOOL_TIMEOUT_MS: u64 = 5_000;

/// How failures are mapped onto JSON-RPC error codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorCodeMode {
    /// Every failure is reported as `-32603`; unknown methods get an empty result.
    #[default]
    Lenient,
    /// Standard JSON-RPC codes; unknown methods are rejected.
    Strict,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub public_url: Option<String>,
    pub heartbeat_interval: Duration,
    pub tool_timeout: Duration,
    pub error_codes: ErrorCodeMode,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
    #[error("MCP_PUBLIC_URL must be an absolute http(s) URL")]
    InvalidPublicUrl,
    #[error("MCP_HEARTBEAT_SECS must be a positive integer")]
    InvalidHeartbeat,
    #[error("MCP_TOOL_TIMEOUT_MS must be a positive integer")]
    InvalidToolTimeout,
    #[error("MCP_ERROR_CODES must be one of: lenient, strict")]
    InvalidErrorCodes,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            bind_port: 8080,
            public_url: None,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            tool_timeout: Duration::from_millis(DEFAULT_TOOL_TIMEOUT_MS),
            error_codes: ErrorCodeMode::Lenient,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = read("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let bind_port = read("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(defaults.bind_port);

        let public_url = read("MCP_PUBLIC_URL")
            .map(|value| {
                if value.starts_with("http://") || value.starts_with("https://") {
                    Ok(value.trim_end_matches('/').to_string())
                } else {
                    Err(ConfigError::InvalidPublicUrl)
                }
            })
            .transpose()?;

        let heartbeat_interval = read("MCP_HEARTBEAT_SECS")
            .map(|value| parse_positive(&value, ConfigError::InvalidHeartbeat))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(defaults.heartbeat_interval);

        let tool_timeout = read("MCP_TOOL_TIMEOUT_MS")
            .map(|value| parse_positive(&value, ConfigError::InvalidToolTimeout))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(defaults.tool_timeout);

        let error_codes = match read("MCP_ERROR_CODES")
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("lenient") => ErrorCodeMode::Lenient,
            Some("strict") => ErrorCodeMode::Strict,
            Some(_) => return Err(ConfigError::InvalidErrorCodes),
        };

        let config = Self {
            bind_addr,
            bind_port,
            public_url,
            heartbeat_interval,
            tool_timeout,
            error_codes,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }

    /// Origin used when a subscribing client sends no `Host` header.
    pub fn fallback_origin(&self) -> String {
        format!("http://{}:{}", self.bind_addr, self.bind_port)
    }
}

fn parse_positive(value: &str, error: ConfigError) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(error),
    }
}
