use std::sync::{Arc, OnceLock};

use crate::{AppError, AppResult, TenantId};

/// Tenant identity for one inbound request or one background job invocation.
///
/// A context starts empty and is populated at most once. Clones share the same
/// slot, so the resolver and every downstream consumer of a request observe one
/// value. Contexts are never shared between requests.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    tenant_id: Arc<OnceLock<TenantId>>,
}

impl TenantContext {
    /// Creates an empty context, as used by migrations and background jobs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context already bound to a tenant.
    #[must_use]
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        let context = Self::new();
        let _ = context.tenant_id.set(tenant_id);
        context
    }

    /// Binds the context to a tenant.
    ///
    /// Setting the same tenant again is a no-op. Attempting to rebind to a
    /// different tenant fails and leaves the original value in place.
    pub fn set_tenant(&self, tenant_id: TenantId) -> AppResult<()> {
        match self.tenant_id.get() {
            Some(existing) if existing == &tenant_id => Ok(()),
            Some(existing) => Err(AppError::Conflict(format!(
                "tenant context is already bound to '{existing}' and cannot switch to '{tenant_id}'"
            ))),
            None => {
                if let Err(rejected) = self.tenant_id.set(tenant_id) {
                    // Lost a race with another writer of the same request.
                    return self.set_tenant(rejected);
                }
                Ok(())
            }
        }
    }

    /// Returns the acting tenant, if one has been resolved.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.get()
    }

    /// Returns whether the context carries a tenant.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.tenant_id.get().is_some()
    }
}
