use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_BC_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BC_RETRY_UNIT_MS: u64 = 1000;

/// BC API connection settings.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct BcConfig {
    /// Base URL of the BC API (company-scoped path included).
    #[validate(url)]
    pub base_url: String,

    /// Pre-issued access token for the service account; token refresh is
    /// handled outside this crate.
    #[serde(default)]
    pub access_token: String,

    /// Retry budget per page fetch.
    #[serde(default = "default_bc_max_attempts")]
    pub max_attempts: u32,

    /// Base unit of the linear retry backoff, in milliseconds.
    #[serde(default = "default_bc_retry_unit_ms")]
    pub retry_unit_ms: u64,
}

fn default_bc_max_attempts() -> u32 {
    DEFAULT_BC_MAX_ATTEMPTS
}

fn default_bc_retry_unit_ms() -> u64 {
    DEFAULT_BC_RETRY_UNIT_MS
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum database connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Deployment environment name
    #[serde(default = "default_environment")]
    pub environment: String,

    /// BC API settings
    #[validate]
    pub bc: BcConfig,
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

impl AppConfig {
    /// Constructs a configuration directly, used by tests and embedders.
    pub fn new(database_url: String, bc_base_url: String, bc_access_token: String) -> Self {
        Self {
            database_url,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            environment: "test".to_string(),
            bc: BcConfig {
                base_url: bc_base_url,
                access_token: bc_access_token,
                max_attempts: DEFAULT_BC_MAX_ATTEMPTS,
                retry_unit_ms: DEFAULT_BC_RETRY_UNIT_MS,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Loads configuration from layered sources: a base file, an
/// environment-specific file, and `BCBRIDGE_`-prefixed environment
/// variables (highest precedence).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder()
        .set_default("environment", run_env.clone())?
        .set_default("bc.max_attempts", DEFAULT_BC_MAX_ATTEMPTS as i64)?
        .set_default("bc.retry_unit_ms", DEFAULT_BC_RETRY_UNIT_MS as i64)?;

    let base_path = Path::new(CONFIG_DIR).join("default");
    builder = builder.add_source(File::from(base_path).required(false));

    let env_path = Path::new(CONFIG_DIR).join(&run_env);
    builder = builder.add_source(File::from(env_path).required(false));

    builder = builder.add_source(Environment::with_prefix("BCBRIDGE").separator("__"));

    let config: AppConfig = builder.build()?.try_deserialize()?;

    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    info!(environment = %config.environment, "configuration loaded");
    Ok(config)
}
