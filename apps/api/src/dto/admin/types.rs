use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Query string for administrative tenant reads.
#[derive(Debug, Default, Deserialize)]
pub struct AdminReadQuery {
    /// Audit justification, for example a support ticket reference.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query string for the administrative access audit log.
#[derive(Debug, Default, Deserialize)]
pub struct AdminAuditEventsQuery {
    pub target_tenant_id: Option<String>,
    pub admin_user_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// API representation of one administrative access audit event.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/admin-access-audit-event-response.ts"
)]
pub struct AdminAccessAuditEventResponse {
    pub event_id: String,
    pub admin_user_id: String,
    pub target_tenant_id: String,
    pub reason: String,
    pub status: String,
    pub error_detail: Option<String>,
    pub occurred_at: String,
}
