use std::sync::Arc;

use palisade_application::{AdminReadAccessService, TenantDataService, TenantResolutionService};
use palisade_infrastructure::{
    PostgresAdminAuditRepository, PostgresReadOnlyTenantStore, PostgresRoleRepository,
    PostgresTenantStore, PostgresUserDirectory, RowLevelSecurityHealthCheck,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::auth::TokenVerifier;
use crate::state::AppState;

pub fn build_app_state(config: &ApiConfig, pool: PgPool) -> AppState {
    let tenant_store = Arc::new(PostgresTenantStore::new(pool.clone()));

    let tenant_resolution_service = TenantResolutionService::new(
        config.tenant_resolution_settings(),
        Arc::new(PostgresUserDirectory::new(pool.clone())),
    );
    let tenant_data_service = TenantDataService::new(tenant_store.clone(), tenant_store);
    let admin_read_access_service = AdminReadAccessService::new(
        Arc::new(PostgresRoleRepository::new(pool.clone())),
        Arc::new(PostgresAdminAuditRepository::new(pool.clone())),
        Arc::new(PostgresReadOnlyTenantStore::new(pool.clone())),
        config.admin_role.as_str(),
    );

    AppState {
        token_verifier: TokenVerifier::new(config.jwt_secret.as_str()),
        tenant_resolution_service,
        tenant_data_service,
        admin_read_access_service,
        rls_health_check: Some(RowLevelSecurityHealthCheck::new(pool.clone())),
        postgres_pool: Some(pool),
    }
}

/// Wires every port to one in-memory store.
#[cfg(test)]
pub fn build_in_memory_app_state(
    store: Arc<palisade_infrastructure::InMemoryTenantStore>,
    settings: palisade_application::TenantResolutionSettings,
    jwt_secret: &str,
    admin_role: &str,
) -> AppState {
    AppState {
        token_verifier: TokenVerifier::new(jwt_secret),
        tenant_resolution_service: TenantResolutionService::new(settings, store.clone()),
        tenant_data_service: TenantDataService::new(store.clone(), store.clone()),
        admin_read_access_service: AdminReadAccessService::new(
            store.clone(),
            store.clone(),
            store,
            admin_role,
        ),
        postgres_pool: None,
        rls_health_check: None,
    }
}
