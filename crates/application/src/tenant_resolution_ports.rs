use async_trait::async_trait;
use palisade_core::{AppResult, TenantId};
use palisade_domain::UserId;

/// Projection returned by the user directory fallback lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTenantLookup {
    /// Directory user identifier.
    pub user_id: UserId,
    /// Tenant the user belongs to.
    pub tenant_id: TenantId,
}

/// Port for resolving a tenant from an identity provider subject.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds the tenant of the user registered under `subject`.
    ///
    /// Implementations must run a single-row lookup that is not itself
    /// restricted by tenant row-level security.
    async fn lookup_tenant_by_subject(&self, subject: &str)
    -> AppResult<Option<UserTenantLookup>>;
}
