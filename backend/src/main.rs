//! Service entry-point: configuration, adapters, and the HTTP server.

use std::sync::Arc;

use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use vatqr::domain::RecordService;
use vatqr::inbound::http::state::HttpState;
use vatqr::outbound::persistence::{DbPool, DieselRecordRepository, PoolConfig};
use vatqr::outbound::{OidcIdentityProvider, PngQrRenderer};
use vatqr::server::{self, AppConfig};

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

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "failed to load .env file");
        }
    }

    let env = DefaultEnv::new();
    let config = AppConfig::from_env(&env).map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(config.database.url()))
        .await
        .map_err(std::io::Error::other)?;
    let records = RecordService::new(Arc::new(DieselRecordRepository::new(pool)));

    let identity = OidcIdentityProvider::discover(
        &config.oidc.issuer_url,
        config.oidc.client_id.clone(),
        config.oidc.client_secret.clone(),
        config.callback_url.clone(),
        config.public_url().clone(),
    )
    .await
    .map_err(std::io::Error::other)?;

    let state = HttpState::new(
        records,
        Arc::new(identity),
        Arc::new(PngQrRenderer::default()),
        config.base_url.clone(),
    );

    info!(base_url = %config.base_url, "starting server");
    server::run(config, state).await
}
