use palisade_application::{AdminReadAccessService, TenantDataService, TenantResolutionService};
use palisade_infrastructure::RowLevelSecurityHealthCheck;
use sqlx::PgPool;

use crate::auth::TokenVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub token_verifier: TokenVerifier,
    pub tenant_resolution_service: TenantResolutionService,
    pub tenant_data_service: TenantDataService,
    pub admin_read_access_service: AdminReadAccessService,
    /// Absent when the API runs over in-memory storage.
    pub postgres_pool: Option<PgPool>,
    pub rls_health_check: Option<RowLevelSecurityHealthCheck>,
}
