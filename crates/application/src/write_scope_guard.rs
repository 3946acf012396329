use palisade_core::{AppError, AppResult, TenantContext};
use palisade_domain::TenantScoped;
use tracing::error;

use crate::PendingChange;

/// Application-layer check that pending writes stay inside the acting tenant.
///
/// Runs independently of storage row-level security. Only changes to existing
/// rows are checked; new rows are stamped by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteScopeGuard;

impl WriteScopeGuard {
    /// Validates every pending change against the context tenant.
    ///
    /// An empty context skips validation. The first mismatching change aborts
    /// the whole batch.
    pub fn validate(context: &TenantContext, changes: &[PendingChange]) -> AppResult<()> {
        let Some(acting_tenant_id) = context.tenant_id() else {
            return Ok(());
        };

        let violation = changes
            .iter()
            .filter(|change| change.state.touches_existing_row())
            .find(|change| change.record.tenant_id() != acting_tenant_id);

        let Some(change) = violation else {
            return Ok(());
        };

        error!(
            entity_type = change.record.entity_type(),
            entity_state = %change.state,
            entity_tenant_id = %change.record.tenant_id(),
            acting_tenant_id = %acting_tenant_id,
            "cross-tenant write blocked"
        );

        Err(AppError::CrossTenantViolation {
            entity_type: change.record.entity_type().to_owned(),
            entity_tenant_id: change.record.tenant_id().to_string(),
            acting_tenant_id: acting_tenant_id.to_string(),
        })
    }
}
