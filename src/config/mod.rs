use serde::Deserialize;

// Top-level configuration, grouped by concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub features: FeatureFlags,
}

// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

// Database settings. `memory` as the URL selects the in-process store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

// Venue image storage
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub dir: String,
    pub public_url: String,
    pub max_image_bytes: usize,
}

// Feature flags
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_antiforgery: bool,
}

/// Flat view of the environment, one field per variable.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    host: String,
    port: u16,
    environment: String,
    rust_log: String,
    log_format: LogFormat,
    database_url: String,
    db_pool_size: u32,
    storage_dir: String,
    storage_public_url: String,
    max_image_bytes: usize,
    enable_antiforgery: bool,
}

impl Config {
    /// Reads settings from process environment variables, falling back to defaults
    /// for everything except `DATABASE_URL`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::default())
    }

    fn from_source(env: config::Environment) -> Result<Self, config::ConfigError> {
        let settings: EnvSettings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000_i64)?
            .set_default("environment", "development")?
            .set_default("rust_log", "eventease=debug,tower_http=debug")?
            .set_default("log_format", "pretty")?
            .set_default("db_pool_size", 20_i64)?
            .set_default("storage_dir", "./uploads")?
            .set_default("storage_public_url", "http://localhost:8000/images")?
            .set_default("max_image_bytes", 5_i64 * 1024 * 1024)?
            .set_default("enable_antiforgery", true)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings.into())
    }
}

impl From<EnvSettings> for Config {
    fn from(s: EnvSettings) -> Self {
        Config {
            app: AppConfig {
                host: s.host,
                port: s.port,
                environment: s.environment,
                rust_log: s.rust_log,
                log_format: s.log_format,
            },
            database: DatabaseConfig {
                url: s.database_url,
                pool_size: s.db_pool_size,
            },
            storage: StorageConfig {
                dir: s.storage_dir,
                public_url: s.storage_public_url,
                max_image_bytes: s.max_image_bytes,
            },
            features: FeatureFlags {
                enable_antiforgery: s.enable_antiforgery,
            },
        }
    }
}
