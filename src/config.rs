use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

const DEFAULT_AGENCY_NAME: &str = "National Ambulance Service";
const DEFAULT_DISTRICT: &str = "Accra Metropolitan Assembly";
const DEFAULT_CASUAL_STAFF_PREFIX: &str = "CA";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Payroll business configuration.
///
/// The legacy system kept these as a database singleton; here they are an
/// explicit value object loaded once and passed into the services, never
/// read as ambient state.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct PayrollConfig {
    /// Agency name stamped onto every payslip snapshot
    #[serde(default = "default_agency_name")]
    #[validate(length(min = 1))]
    pub agency_name: String,

    /// District used when a generation request does not override it
    #[serde(default = "default_district")]
    #[validate(length(min = 1))]
    pub default_district: String,

    /// Default SSNIT contribution rate (%)
    #[serde(default = "default_ssnit_rate")]
    pub ssnit_rate: Decimal,

    /// Default Tier 2 pension contribution rate (%)
    #[serde(default = "default_tier2_rate")]
    pub tier2_rate: Decimal,

    /// Staff-ID prefix identifying casual employees
    #[serde(default = "default_casual_staff_prefix")]
    #[validate(length(min = 1))]
    pub casual_staff_prefix: String,
}

fn default_agency_name() -> String {
    DEFAULT_AGENCY_NAME.to_string()
}
fn default_district() -> String {
    DEFAULT_DISTRICT.to_string()
}
fn default_ssnit_rate() -> Decimal {
    dec!(5.5)
}
fn default_tier2_rate() -> Decimal {
    dec!(3.5)
}
fn default_casual_staff_prefix() -> String {
    DEFAULT_CASUAL_STAFF_PREFIX.to_string()
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            agency_name: default_agency_name(),
            default_district: default_district(),
            ssnit_rate: default_ssnit_rate(),
            tier2_rate: default_tier2_rate(),
            casual_staff_prefix: default_casual_staff_prefix(),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Host address for the HTTP server
    pub host: String,

    /// Port for the HTTP server
    pub port: u16,

    /// Environment name (development, test, production)
    pub environment: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Run migrations on startup
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,

    /// Maximum database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum database connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Payroll business defaults
    #[serde(default)]
    #[validate]
    pub payroll: PayrollConfig,
}

fn default_auto_migrate() -> bool {
    true
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Minimal constructor for tests and tooling.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            payroll: PayrollConfig::default(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Loads configuration from `config/default`, an environment-specific
/// overlay, and `APP__*` environment variables, in that order.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://payroll.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;

    Ok(app_config)
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("payroll_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter =
        EnvFilter::try_new(filter_directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payroll_defaults_match_statutory_rates() {
        let payroll = PayrollConfig::default();
        assert_eq!(payroll.ssnit_rate, dec!(5.5));
        assert_eq!(payroll.tier2_rate, dec!(3.5));
        assert_eq!(payroll.casual_staff_prefix, "CA");
        assert!(payroll.validate().is_ok());
    }

    #[test]
    fn minimal_config_validates() {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            8080,
            "test".to_string(),
        );
        assert!(cfg.validate().is_ok());
        assert!(!cfg.is_production());
    }
}
