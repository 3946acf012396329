use palisade_application::AdminAuditQuery;
use palisade_core::{AppError, TenantId};
use palisade_domain::AdminAccessAuditEvent;

use super::types::{AdminAccessAuditEventResponse, AdminAuditEventsQuery};

impl From<AdminAccessAuditEvent> for AdminAccessAuditEventResponse {
    fn from(event: AdminAccessAuditEvent) -> Self {
        Self {
            event_id: event.event_id().to_string(),
            admin_user_id: event.admin_user_id().as_str().to_owned(),
            target_tenant_id: event.target_tenant_id().to_string(),
            reason: event.reason().as_str().to_owned(),
            status: event.status().as_str().to_owned(),
            error_detail: event.error_detail().map(ToOwned::to_owned),
            occurred_at: event.occurred_at().to_rfc3339(),
        }
    }
}

impl TryFrom<AdminAuditEventsQuery> for AdminAuditQuery {
    type Error = AppError;

    fn try_from(query: AdminAuditEventsQuery) -> Result<Self, Self::Error> {
        if let (Some(from), Some(to)) = (query.from, query.to)
            && from >= to
        {
            return Err(AppError::Validation(
                "audit query 'from' must be earlier than 'to'".to_owned(),
            ));
        }

        let target_tenant_id = query
            .target_tenant_id
            .filter(|value| !value.trim().is_empty())
            .map(TenantId::new)
            .transpose()?;

        Ok(Self {
            target_tenant_id,
            admin_user_id: query
                .admin_user_id
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            from: query.from,
            to: query.to,
            limit: query.limit.unwrap_or(Self::DEFAULT_LIMIT),
            offset: query.offset.unwrap_or(0),
        }
        .normalized())
    }
}
