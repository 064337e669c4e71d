use anyhow::{bail, Context, Result};

/// Which `DataStore` backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Volatile in-process store for local runs without a database.
    Memory,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub auth_url: String,
    pub auth_api_key: String,
    pub cors_allow_origin: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => Some(require("DATABASE_URL")?),
            StoreBackend::Memory => lookup("DATABASE_URL"),
        };

        Ok(Config {
            store_backend,
            database_url,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            auth_url: require("AUTH_URL")?,
            auth_api_key: require("AUTH_API_KEY")?,
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").filter(|v| !v.is_empty()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
