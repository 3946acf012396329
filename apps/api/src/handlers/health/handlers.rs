use super::checks::{check_postgres, check_row_level_security};
use super::*;

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let postgres = check_postgres(state.postgres_pool.clone()).await;

    let ready = postgres.status != "error";
    let status = if ready { "ok" } else { "degraded" };
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            ready,
            postgres,
        }),
    )
}

pub async fn rls_health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<RlsHealthResponse>) {
    let health = check_row_level_security(state.rls_health_check.clone()).await;
    let http_status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(RlsHealthResponse::from(health)))
}
