pub mod background;
pub mod chat;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod infra;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::background::start_refresh_worker;
use crate::config::{Config, ConfigError};
use crate::infra::{DisabledGeocoder, GoTrueAuth, NominatimGeocoder, PgEventBackend};
use crate::routes::create_routes;
use crate::services::Geocoder;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migrations failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,plot_server=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Successfully connected to database");

    sqlx::migrate!().run(&pool).await?;
    info!("Migrations run successfully");

    let events = Arc::new(PgEventBackend::new(pool));
    let auth = Arc::new(GoTrueAuth::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    let geocoder: Arc<dyn Geocoder> = match &config.geocoder_url {
        Some(url) => Arc::new(NominatimGeocoder::new(url.clone())),
        None => {
            info!("GEOCODER_URL not set, events will be created without coordinates");
            Arc::new(DisabledGeocoder)
        }
    };

    let port = config.port;
    let refresh_interval = config.refresh_interval;
    let (state, changes) = AppState::new(config, events, auth, geocoder);

    if !state.store.refresh().await {
        warn!("Starting with an empty event list");
    }
    tokio::spawn(start_refresh_worker(
        state.store.clone(),
        state.engagement.clone(),
        changes,
        refresh_interval,
    ));

    let app = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
