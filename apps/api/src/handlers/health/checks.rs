use palisade_infrastructure::{RlsHealth, RowLevelSecurityHealthCheck};

use super::*;

pub(super) async fn check_postgres(pool: Option<sqlx::PgPool>) -> HealthDependencyStatus {
    let Some(pool) = pool else {
        return HealthDependencyStatus {
            status: "disabled",
            detail: None,
        };
    };

    let check = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await;

    match check {
        Ok(_) => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Err(error) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("postgres check failed: {error}")),
        },
    }
}

pub(super) async fn check_row_level_security(
    health_check: Option<RowLevelSecurityHealthCheck>,
) -> RlsHealth {
    match health_check {
        Some(health_check) => health_check.check().await,
        None => RlsHealth::Degraded(
            "row-level security is not available without postgres storage".to_owned(),
        ),
    }
}
