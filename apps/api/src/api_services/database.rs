use palisade_core::AppError;
use palisade_infrastructure::with_session_reset_hooks;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connects a pool whose connections drop any tenant binding on connect and
/// release, then applies migrations.
pub async fn connect_and_migrate(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, AppError> {
    let pool = with_session_reset_hooks(PgPoolOptions::new())
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}
