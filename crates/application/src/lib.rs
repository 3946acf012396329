//! Application services and ports.

#![forbid(unsafe_code)]

mod admin_access_ports;
mod admin_read_access_service;
mod tenant_data_ports;
mod tenant_data_service;
mod tenant_resolution_ports;
mod tenant_resolution_service;
mod unit_of_work;
mod write_scope_guard;

pub use admin_access_ports::{
    AdminAuditQuery, AdminAuditRepository, ReadOnlyTenantStore, RoleService,
};
pub use admin_read_access_service::{AdminReadAccessService, AdminReadScope, DEFAULT_ADMIN_ROLE};
pub use tenant_data_ports::{ChangeStore, PendingChange, TenantReadRepository};
pub use tenant_data_service::{TenantDataService, UpdateTodoInput};
pub use tenant_resolution_ports::{UserDirectory, UserTenantLookup};
pub use tenant_resolution_service::{
    DEFAULT_ALTERNATE_TENANT_CLAIM, DEFAULT_TENANT_CLAIM, TenantResolution,
    TenantResolutionService, TenantResolutionSettings,
};
pub use unit_of_work::UnitOfWork;
pub use write_scope_guard::WriteScopeGuard;
