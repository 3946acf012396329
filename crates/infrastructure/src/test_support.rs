use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use palisade_core::TenantId;

use crate::tenant_session::with_session_reset_hooks;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connects to `DATABASE_URL` and applies migrations, or returns `None` when
/// the variable is unset so database tests are skipped.
pub(crate) async fn test_pool(max_connections: u32) -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match with_session_reset_hooks(PgPoolOptions::new())
        .max_connections(max_connections)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

/// Returns a tenant id unique to one test run.
pub(crate) fn unique_tenant(prefix: &str) -> TenantId {
    TenantId::new(format!("{prefix}-{}", Uuid::new_v4())).unwrap_or_else(|_| unreachable!())
}
