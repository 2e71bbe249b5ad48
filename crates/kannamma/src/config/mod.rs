use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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
    pub campaign: CampaignConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            campaign: CampaignConfig::from_env()?,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which telephony seam backs the campaign engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallProviderKind {
    Mock,
    Webhook,
}

impl CallProviderKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" | "simulated" => Ok(Self::Mock),
            "webhook" | "ivr" => Ok(Self::Webhook),
            other => Err(ConfigError::InvalidProvider(other.to_string())),
        }
    }
}

/// Call campaign pacing and provider selection.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub min_call_delay: Duration,
    pub max_call_delay: Duration,
    pub provider: CallProviderKind,
    pub answer_timeout: Duration,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            min_call_delay: Duration::from_millis(500),
            max_call_delay: Duration::from_millis(1000),
            provider: CallProviderKind::Mock,
            answer_timeout: Duration::from_secs(45),
        }
    }
}

impl CampaignConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_ms = read_u64("CAMPAIGN_MIN_DELAY_MS")
            .map_err(|_| ConfigError::InvalidDelay)?
            .unwrap_or(defaults.min_call_delay.as_millis() as u64);
        let max_ms = read_u64("CAMPAIGN_MAX_DELAY_MS")
            .map_err(|_| ConfigError::InvalidDelay)?
            .unwrap_or(defaults.max_call_delay.as_millis() as u64);
        if max_ms == 0 || min_ms > max_ms {
            return Err(ConfigError::InvalidDelay);
        }

        let provider = match env::var("CALL_PROVIDER") {
            Ok(raw) => CallProviderKind::parse(&raw)?,
            Err(_) => defaults.provider,
        };

        let answer_timeout = read_u64("IVR_ANSWER_TIMEOUT_SECS")
            .map_err(|_| ConfigError::InvalidTimeout)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.answer_timeout);
        if answer_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(Self {
            min_call_delay: Duration::from_millis(min_ms),
            max_call_delay: Duration::from_millis(max_ms),
            provider,
            answer_timeout,
        })
    }
}

fn read_u64(key: &str) -> Result<Option<u64>, std::num::ParseIntError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>().map(Some),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDelay,
    InvalidProvider(String),
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDelay => write!(
                f,
                "CAMPAIGN_MIN_DELAY_MS and CAMPAIGN_MAX_DELAY_MS must be integers with 0 <= min <= max and max > 0"
            ),
            ConfigError::InvalidProvider(value) => {
                write!(f, "CALL_PROVIDER '{value}' must be one of: mock, webhook")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "IVR_ANSWER_TIMEOUT_SECS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDelay
            | ConfigError::InvalidProvider(_)
            | ConfigError::InvalidTimeout => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CAMPAIGN_MIN_DELAY_MS",
            "CAMPAIGN_MAX_DELAY_MS",
            "CALL_PROVIDER",
            "IVR_ANSWER_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.campaign.min_call_delay, Duration::from_millis(500));
        assert_eq!(config.campaign.max_call_delay, Duration::from_millis(1000));
        assert_eq!(config.campaign.provider, CallProviderKind::Mock);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_inverted_delay_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CAMPAIGN_MIN_DELAY_MS", "900");
        env::set_var("CAMPAIGN_MAX_DELAY_MS", "100");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidDelay)));
        reset_env();
    }

    #[test]
    fn parses_webhook_provider() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CALL_PROVIDER", "Webhook");
        env::set_var("IVR_ANSWER_TIMEOUT_SECS", "30");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.campaign.provider, CallProviderKind::Webhook);
        assert_eq!(config.campaign.answer_timeout, Duration::from_secs(30));

        env::set_var("CALL_PROVIDER", "carrier-pigeon");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidProvider(value)) if value == "carrier-pigeon"
        ));
        reset_env();
    }
}
