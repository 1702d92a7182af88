use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_users::ActivationSettings;
use std::time::Duration;

pub use core_config::Environment;

/// Activation-code issuance
///
/// - ACTIVATION_CODE_TTL_SECS: defaults to 300
/// - APP_DISPLAY_NAME: product name used in activation mail, defaults to "Admin"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationConfig {
    pub code_ttl_secs: u64,
    pub app_name: String,
}

impl FromEnv for ActivationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let code_ttl_secs = env_parse("ACTIVATION_CODE_TTL_SECS", 300u64)?;
        if code_ttl_secs == 0 {
            return Err(ConfigError::ParseError {
                key: "ACTIVATION_CODE_TTL_SECS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            code_ttl_secs,
            app_name: env_or_default("APP_DISPLAY_NAME", "Admin"),
        })
    }
}

impl ActivationConfig {
    pub fn settings(&self) -> ActivationSettings {
        ActivationSettings {
            code_ttl: Duration::from_secs(self.code_ttl_secs),
            app_name: self.app_name.clone(),
        }
    }
}

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub activation: ActivationConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let app = app_info!();
        let mongodb = MongoConfig::from_env()?.with_app_name(app.name);
        let server = ServerConfig::from_env()?;
        let activation = ActivationConfig::from_env()?;

        Ok(Self {
            app,
            mongodb,
            server,
            activation,
            environment,
        })
    }
}
