use palisade_infrastructure::RlsHealth;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Row-level security verification payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/rls-health-response.ts"
)]
pub struct RlsHealthResponse {
    pub status: &'static str,
    pub healthy: bool,
    pub detail: String,
}

impl From<RlsHealth> for RlsHealthResponse {
    fn from(health: RlsHealth) -> Self {
        Self {
            status: health.status(),
            healthy: health.is_healthy(),
            detail: health.detail().to_owned(),
        }
    }
}
