//! Configuration for the Catalog API

use core_config::{app_info, database::DatabaseConfig, server::ServerConfig, AppInfo, FromEnv};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    /// `None` means no `DATABASE_URL`; the app then serves from the
    /// in-memory store.
    pub database: Option<DatabaseConfig>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let database = DatabaseConfig::from_env_optional();

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            database,
        })
    }
}
