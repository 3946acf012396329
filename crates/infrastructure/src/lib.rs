//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_tenant_store;
mod postgres_admin_audit_repository;
mod postgres_role_repository;
mod postgres_tenant_store;
mod postgres_user_directory;
mod row_level_security_health;
mod tenant_session;

#[cfg(test)]
mod test_support;

pub use in_memory_tenant_store::InMemoryTenantStore;
pub use postgres_admin_audit_repository::PostgresAdminAuditRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_tenant_store::{PostgresReadOnlyTenantStore, PostgresTenantStore};
pub use postgres_user_directory::PostgresUserDirectory;
pub use row_level_security_health::{REQUIRED_RLS_TABLES, RlsHealth, RowLevelSecurityHealthCheck};
pub use tenant_session::{
    CommandSessionBinder, ConnectionSessionBinder, TenantBoundPool, TenantConnection,
    TenantSessionSink, TenantTransaction, with_session_reset_hooks,
};
