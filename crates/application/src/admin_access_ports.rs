use async_trait::async_trait;
use chrono::{DateTime, Utc};
use palisade_core::{AppResult, TenantId};
use palisade_domain::{AdminAccessAuditEvent, TenantUser, TodoItem};

/// Port for operator role membership checks.
#[async_trait]
pub trait RoleService: Send + Sync {
    /// Returns whether `actor_id` holds `role_name`.
    async fn is_in_role(&self, actor_id: &str, role_name: &str) -> AppResult<bool>;
}

/// Filters for listing administrative access audit events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAuditQuery {
    /// Only events targeting this tenant.
    pub target_tenant_id: Option<TenantId>,
    /// Only events by this operator.
    pub admin_user_id: Option<String>,
    /// Inclusive lower bound on `occurred_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `occurred_at`.
    pub to: Option<DateTime<Utc>>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl AdminAuditQuery {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 50;
    /// Largest accepted page size.
    pub const MAX_LIMIT: usize = 500;

    /// Returns the query with `limit` clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
            ..self
        }
    }
}

impl Default for AdminAuditQuery {
    fn default() -> Self {
        Self {
            target_tenant_id: None,
            admin_user_id: None,
            from: None,
            to: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Append-only store for administrative access audit events.
///
/// The log is global and never filtered by tenant row-level security.
#[async_trait]
pub trait AdminAuditRepository: Send + Sync {
    /// Appends one immutable event.
    async fn append_event(&self, event: AdminAccessAuditEvent) -> AppResult<()>;

    /// Lists events newest first.
    async fn list_events(&self, query: AdminAuditQuery) -> AppResult<Vec<AdminAccessAuditEvent>>;
}

/// Read-only storage access for an explicitly named tenant.
///
/// Implementations ignore any request tenant context and never expose write
/// operations.
#[async_trait]
pub trait ReadOnlyTenantStore: Send + Sync {
    /// Lists users of `tenant_id`.
    async fn list_users(&self, tenant_id: &TenantId) -> AppResult<Vec<TenantUser>>;

    /// Lists todos of `tenant_id`.
    async fn list_todos(&self, tenant_id: &TenantId) -> AppResult<Vec<TodoItem>>;
}
