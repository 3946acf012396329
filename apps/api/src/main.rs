//! Palisade API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use palisade_core::AppError;
use palisade_infrastructure::RowLevelSecurityHealthCheck;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool =
        connect_and_migrate(&config.database_url, config.database_max_connections).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    if config.rls_startup_check {
        let health = RowLevelSecurityHealthCheck::new(pool.clone()).check().await;
        if !health.is_healthy() {
            return Err(AppError::Internal(format!(
                "refusing to start with {} row-level security: {}",
                health.status(),
                health.detail()
            )));
        }
    }

    let app_state = build_app_state(&config, pool);
    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "palisade-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
