mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod profiles;
mod routes;
mod search;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::HostedAuthClient;
use crate::config::{Config, StoreBackend};
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgStore;
use crate::store::DataStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;

    let auth = HostedAuthClient::new(&config.auth_url, config.auth_api_key.clone())
        .context("Failed to build auth provider client")?;
    info!("Auth provider client initialized ({})", config.auth_url);

    let state = AppState {
        store,
        auth: Arc::new(auth),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn DataStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(url, config.database_max_connections).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_cors(config: &Config) -> Result<CorsLayer> {
    match &config.cors_allow_origin {
        Some(origin) => Ok(CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .context("CORS_ALLOW_ORIGIN must be a valid origin")?,
            )
            .allow_methods(Any)
            .allow_headers(Any)),
        None => Ok(CorsLayer::permissive()),
    }
}
