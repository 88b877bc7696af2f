use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::substitution::ScoringPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub substitution: SubstitutionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = SubstitutionConfig::default();
        let substitution = SubstitutionConfig {
            affinity_bonus: numeric_var("SUBSTITUTION_AFFINITY_BONUS")?
                .unwrap_or(defaults.affinity_bonus),
            load_penalty: numeric_var("SUBSTITUTION_LOAD_PENALTY")?
                .unwrap_or(defaults.load_penalty),
            max_active_load: numeric_var("SUBSTITUTION_MAX_ACTIVE_LOAD")?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                style: LogStyle::for_environment(environment),
            },
            substitution,
        })
    }
}

fn numeric_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key }),
        _ => Ok(None),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub style: LogStyle,
}

/// Shape of emitted log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// Colored output with targets and source locations, for local runs.
    Verbose,
    /// Single-line plain output for CI and deployed services.
    Compact,
}

impl LogStyle {
    pub fn for_environment(environment: AppEnvironment) -> Self {
        match environment {
            AppEnvironment::Development => Self::Verbose,
            AppEnvironment::Test | AppEnvironment::Production => Self::Compact,
        }
    }
}

/// Weights and guards applied when picking a substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionConfig {
    pub affinity_bonus: i32,
    pub load_penalty: i32,
    /// When set, a candidate whose active load has reached this value by commit
    /// time is skipped in favor of the next ranked candidate.
    pub max_active_load: Option<u32>,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            affinity_bonus: 50,
            load_penalty: 15,
            max_active_load: None,
        }
    }
}

impl SubstitutionConfig {
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            affinity_bonus: self.affinity_bonus,
            load_penalty: self.load_penalty,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => write!(f, "{key} must be a whole number"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
