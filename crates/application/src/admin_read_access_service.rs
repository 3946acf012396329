use std::future::Future;
use std::sync::Arc;

use palisade_core::{AppError, AppResult, NonEmptyString, TenantId};
use palisade_domain::{AdminAccessAuditEvent, AdminAccessStatus, TenantUser, TodoItem};
use tracing::{error, warn};

use crate::{AdminAuditQuery, AdminAuditRepository, ReadOnlyTenantStore, RoleService};

/// Role granted to operators allowed to read across tenants.
pub const DEFAULT_ADMIN_ROLE: &str = "DeploymentManagerAdmin";

/// Read-only view of one explicitly targeted tenant.
///
/// Handed to admin queries in place of the request tenant context. It only
/// exposes read operations.
#[derive(Clone)]
pub struct AdminReadScope {
    tenant_id: TenantId,
    store: Arc<dyn ReadOnlyTenantStore>,
}

impl AdminReadScope {
    /// Returns the targeted tenant.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Lists users of the targeted tenant.
    pub async fn list_users(&self) -> AppResult<Vec<TenantUser>> {
        self.store.list_users(&self.tenant_id).await
    }

    /// Lists todos of the targeted tenant.
    pub async fn list_todos(&self) -> AppResult<Vec<TodoItem>> {
        self.store.list_todos(&self.tenant_id).await
    }
}

/// Audited escape hatch for support operators reading another tenant's data.
#[derive(Clone)]
pub struct AdminReadAccessService {
    role_service: Arc<dyn RoleService>,
    audit_repository: Arc<dyn AdminAuditRepository>,
    read_store: Arc<dyn ReadOnlyTenantStore>,
    admin_role: String,
}

impl AdminReadAccessService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        role_service: Arc<dyn RoleService>,
        audit_repository: Arc<dyn AdminAuditRepository>,
        read_store: Arc<dyn ReadOnlyTenantStore>,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            role_service,
            audit_repository,
            read_store,
            admin_role: admin_role.into(),
        }
    }

    /// Runs `query` read-only against `target_tenant_id` on behalf of an operator.
    ///
    /// Validation failures are returned before any audit event. A role check
    /// failure records `Denied`. Otherwise `Attempting` is recorded before the
    /// query and `Success` or `Failed` after it. The query result is returned
    /// unaltered and query errors are propagated unchanged.
    pub async fn execute_read_only<T, F, Fut>(
        &self,
        actor_id: &str,
        target_tenant_id: &str,
        reason: &str,
        query: F,
    ) -> AppResult<T>
    where
        F: FnOnce(AdminReadScope) -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        let reason = NonEmptyString::new(reason).map_err(|_| {
            AppError::InvalidJustification(
                "a reason is required for administrative tenant access".to_owned(),
            )
        })?;
        let target_tenant_id = TenantId::new(target_tenant_id).map_err(|_| {
            AppError::Validation("target tenant id must not be empty".to_owned())
        })?;
        let actor_id = NonEmptyString::new(actor_id).map_err(|_| {
            AppError::AuthenticationRequired(
                "administrative tenant access requires an identified operator".to_owned(),
            )
        })?;

        if !self.is_admin(actor_id.as_str()).await? {
            self.record(AdminAccessAuditEvent::record(
                actor_id.clone(),
                target_tenant_id.clone(),
                reason,
                AdminAccessStatus::Denied,
            ))
            .await?;

            return Err(AppError::UnauthorizedAccess(format!(
                "subject '{}' is not allowed to read tenant '{target_tenant_id}'",
                actor_id.as_str()
            )));
        }

        self.record(AdminAccessAuditEvent::record(
            actor_id.clone(),
            target_tenant_id.clone(),
            reason.clone(),
            AdminAccessStatus::Attempting,
        ))
        .await?;

        let scope = AdminReadScope {
            tenant_id: target_tenant_id.clone(),
            store: self.read_store.clone(),
        };

        match query(scope).await {
            Ok(value) => {
                self.record(AdminAccessAuditEvent::record(
                    actor_id,
                    target_tenant_id,
                    reason,
                    AdminAccessStatus::Success,
                ))
                .await?;
                Ok(value)
            }
            Err(query_error) => {
                let failed = AdminAccessAuditEvent::failed(
                    actor_id,
                    target_tenant_id,
                    reason,
                    query_error.to_string(),
                );
                if let Err(audit_error) = self.record(failed).await {
                    error!(%audit_error, %query_error, "failed to audit admin query failure");
                }
                Err(query_error)
            }
        }
    }

    /// Lists administrative access audit events. Requires the admin role.
    pub async fn list_audit_events(
        &self,
        actor_id: &str,
        query: AdminAuditQuery,
    ) -> AppResult<Vec<AdminAccessAuditEvent>> {
        if !self.is_admin(actor_id).await? {
            return Err(AppError::UnauthorizedAccess(format!(
                "subject '{actor_id}' is not allowed to read the admin access audit log"
            )));
        }

        self.audit_repository
            .list_events(query.normalized())
            .await
    }

    async fn is_admin(&self, actor_id: &str) -> AppResult<bool> {
        if actor_id.trim().is_empty() {
            return Ok(false);
        }

        self.role_service
            .is_in_role(actor_id, self.admin_role.as_str())
            .await
    }

    async fn record(&self, event: AdminAccessAuditEvent) -> AppResult<()> {
        warn!(
            admin_user_id = event.admin_user_id().as_str(),
            target_tenant_id = %event.target_tenant_id(),
            reason = event.reason().as_str(),
            status = event.status().as_str(),
            error_detail = event.error_detail(),
            "admin tenant access"
        );

        self.audit_repository.append_event(event).await
    }
}
