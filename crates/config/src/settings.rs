use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub signup: SignupSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SignupSettings {
    pub min_password_length: usize,
    /// Prefix for generated invite codes, e.g. `INV` -> `INV-3fKq9x`.
    pub invite_code_prefix: String,
    /// Single-use admin invite created at startup when missing.
    pub bootstrap_admin_code: Option<String>,
}

impl Default for SignupSettings {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            invite_code_prefix: "INV".to_string(),
            bootstrap_admin_code: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("CREWLEDGER"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.backend", "mongo")?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "crewledger")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.refresh_token_ttl_secs", 604800)?
            .set_default("jwt.issuer", "crewledger")?
            .set_default("signup.min_password_length", 6)?
            .set_default("signup.invite_code_prefix", "INV")?
            .set_default("signup.bootstrap_admin_code", None::<String>)?
            .build()?;

        config.try_deserialize()
    }

    /// Settings for an in-process instance backed by the memory stores.
    pub fn in_memory() -> Self {
        Self {
            app: AppSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: Vec::new(),
            },
            database: DatabaseSettings {
                backend: StorageBackend::Memory,
                url: String::new(),
                name: "crewledger".to_string(),
                max_pool_size: None,
                min_pool_size: None,
            },
            jwt: JwtSettings {
                secret: "in-memory-secret-key-for-jwt-signing".to_string(),
                access_token_ttl_secs: 3600,
                refresh_token_ttl_secs: 604800,
                issuer: "crewledger".to_string(),
            },
            signup: SignupSettings::default(),
        }
    }
}
