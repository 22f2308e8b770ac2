use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::underwriting::{
    ConfigurationError, EngineConfig, OverrideBounds, RiskAppetite, ThresholdTable,
};

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
    pub underwriting: UnderwritingConfig,
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
        let include_targets = environment == AppEnvironment::Development;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets,
            },
            underwriting: UnderwritingConfig::from_env()?,
        })
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
    pub include_targets: bool,
}

/// Decision engine constants plus the appetite used when callers omit one.
#[derive(Debug, Clone)]
pub struct UnderwritingConfig {
    pub engine: EngineConfig,
    pub default_appetite: RiskAppetite,
}

impl UnderwritingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();
        let thresholds = defaults.thresholds;

        let thresholds = ThresholdTable::new(
            env_or(
                "UNDERWRITING_THRESHOLD_CONSERVATIVE",
                thresholds.select(RiskAppetite::Conservative),
            )?,
            env_or(
                "UNDERWRITING_THRESHOLD_BALANCED",
                thresholds.select(RiskAppetite::Balanced),
            )?,
            env_or(
                "UNDERWRITING_THRESHOLD_AGGRESSIVE",
                thresholds.select(RiskAppetite::Aggressive),
            )?,
            env_or(
                "UNDERWRITING_THRESHOLD_VERY_AGGRESSIVE",
                thresholds.select(RiskAppetite::VeryAggressive),
            )?,
        )?;

        let bounds = defaults.overrides;
        let overrides = OverrideBounds {
            extreme_risk_probability: env_or(
                "UNDERWRITING_EXTREME_RISK_PROBABILITY",
                bounds.extreme_risk_probability,
            )?,
            weak_score_floor: env_or("UNDERWRITING_WEAK_SCORE_FLOOR", bounds.weak_score_floor)?,
            max_prior_defaults: env_or(
                "UNDERWRITING_MAX_PRIOR_DEFAULTS",
                bounds.max_prior_defaults,
            )?,
            probability_ceiling: env_or(
                "UNDERWRITING_PROBABILITY_CEILING",
                bounds.probability_ceiling,
            )?,
            strong_profile_max_probability: env_or(
                "UNDERWRITING_STRONG_PROFILE_MAX_PROBABILITY",
                bounds.strong_profile_max_probability,
            )?,
            strong_profile_min_score: env_or(
                "UNDERWRITING_STRONG_PROFILE_MIN_SCORE",
                bounds.strong_profile_min_score,
            )?,
            ..bounds
        };

        let engine = EngineConfig {
            thresholds,
            overrides,
            ..defaults
        };
        engine.validate()?;

        let default_appetite = match env::var("UNDERWRITING_DEFAULT_APPETITE") {
            Ok(raw) => raw.parse::<RiskAppetite>()?,
            Err(_) => RiskAppetite::Balanced,
        };

        Ok(Self {
            engine,
            default_appetite,
        })
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidUnderwritingValue { key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidUnderwritingValue { key: &'static str, value: String },
    Underwriting(ConfigurationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidUnderwritingValue { key, value } => {
                write!(f, "{key} could not be parsed (found '{value}')")
            }
            ConfigError::Underwriting(err) => write!(f, "underwriting configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidUnderwritingValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Underwriting(err) => Some(err),
        }
    }
}

impl From<ConfigurationError> for ConfigError {
    fn from(value: ConfigurationError) -> Self {
        Self::Underwriting(value)
    }
}
