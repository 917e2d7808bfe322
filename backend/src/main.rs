//! Backend entry-point: loads settings, wires stores and serves the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rideshare::inbound::http::health::HealthState;
use rideshare::inbound::http::token_config::fingerprint::secret_fingerprint;
use rideshare::inbound::http::token_config::{BuildMode, token_settings_from_env};
use rideshare::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;

    let token_settings = token_settings_from_env(
        &DefaultEnv::new(),
        BuildMode::from_debug_assertions(),
        settings.token_ttl(),
    )
    .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %secret_fingerprint(token_settings.secret()),
        ttl_seconds = token_settings.ttl().num_seconds(),
        "token signing secret loaded"
    );

    let mut config = ServerConfig::new(token_settings, settings.bind_addr());
    match settings.pool_config() {
        Some(pool_config) => {
            let url = pool_config.database_url().to_owned();
            let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
                .await
                .map_err(std::io::Error::other)?
                .map_err(std::io::Error::other)?;
            info!(applied, "database migrations applied");

            let pool = DbPool::new(pool_config)
                .await
                .map_err(|e| std::io::Error::other(e.into_message()))?;
            config = config.with_db_pool(pool);
        }
        None => warn!("RIDESHARE_DATABASE_URL not set; using in-memory stores"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %settings.bind_addr(), "listening");
    server.await
}
