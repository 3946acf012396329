use std::str::FromStr;

use chrono::{DateTime, Utc};
use palisade_core::{AppError, AppResult, NonEmptyString, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome recorded for one step of an administrative cross-tenant read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminAccessStatus {
    /// Emitted after the role check passes and before the query runs.
    Attempting,
    /// Emitted after the query returned.
    Success,
    /// Emitted when the actor lacks the admin role.
    Denied,
    /// Emitted when the query failed.
    Failed,
}

impl AdminAccessStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attempting => "Attempting",
            Self::Success => "Success",
            Self::Denied => "Denied",
            Self::Failed => "Failed",
        }
    }
}

impl FromStr for AdminAccessStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Attempting" => Ok(Self::Attempting),
            "Success" => Ok(Self::Success),
            "Denied" => Ok(Self::Denied),
            "Failed" => Ok(Self::Failed),
            _ => Err(AppError::Validation(format!(
                "unknown admin access status '{value}'"
            ))),
        }
    }
}

/// Immutable audit record of an administrative read against a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccessAuditEvent {
    event_id: Uuid,
    admin_user_id: NonEmptyString,
    target_tenant_id: TenantId,
    reason: NonEmptyString,
    status: AdminAccessStatus,
    error_detail: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl AdminAccessAuditEvent {
    /// Records a new event at the current time.
    ///
    /// Use [`AdminAccessAuditEvent::failed`] for `Failed` events so the error
    /// detail is carried.
    #[must_use]
    pub fn record(
        admin_user_id: NonEmptyString,
        target_tenant_id: TenantId,
        reason: NonEmptyString,
        status: AdminAccessStatus,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            admin_user_id,
            target_tenant_id,
            reason,
            status,
            error_detail: None,
            occurred_at: Utc::now(),
        }
    }

    /// Records a `Failed` event carrying the query error text.
    #[must_use]
    pub fn failed(
        admin_user_id: NonEmptyString,
        target_tenant_id: TenantId,
        reason: NonEmptyString,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            error_detail: Some(error_detail.into()),
            ..Self::record(
                admin_user_id,
                target_tenant_id,
                reason,
                AdminAccessStatus::Failed,
            )
        }
    }

    /// Rebuilds an event from persisted values.
    pub fn from_parts(
        event_id: Uuid,
        admin_user_id: impl Into<String>,
        target_tenant_id: TenantId,
        reason: impl Into<String>,
        status: AdminAccessStatus,
        error_detail: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if error_detail.is_some() && status != AdminAccessStatus::Failed {
            return Err(AppError::Validation(format!(
                "error detail is only recorded for Failed events, got {}",
                status.as_str()
            )));
        }

        Ok(Self {
            event_id,
            admin_user_id: NonEmptyString::new(admin_user_id)?,
            target_tenant_id,
            reason: NonEmptyString::new(reason)?,
            status,
            error_detail,
            occurred_at,
        })
    }

    /// Returns the generated event id.
    #[must_use]
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Returns the acting operator.
    #[must_use]
    pub fn admin_user_id(&self) -> &NonEmptyString {
        &self.admin_user_id
    }

    /// Returns the tenant whose data was targeted.
    #[must_use]
    pub fn target_tenant_id(&self) -> &TenantId {
        &self.target_tenant_id
    }

    /// Returns the operator-supplied justification.
    #[must_use]
    pub fn reason(&self) -> &NonEmptyString {
        &self.reason
    }

    /// Returns the recorded outcome.
    #[must_use]
    pub fn status(&self) -> AdminAccessStatus {
        self.status
    }

    /// Returns the failure text for `Failed` events.
    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    /// Returns when the event was recorded.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use palisade_core::{NonEmptyString, TenantId};
    use uuid::Uuid;

    use super::{AdminAccessAuditEvent, AdminAccessStatus};

    #[test]
    fn status_roundtrip_storage_value() {
        let restored = AdminAccessStatus::from_str(AdminAccessStatus::Denied.as_str());
        assert!(restored.is_ok());
        assert_eq!(
            restored.unwrap_or(AdminAccessStatus::Success),
            AdminAccessStatus::Denied
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(AdminAccessStatus::from_str("denied").is_err());
    }

    #[test]
    fn failed_event_carries_error_detail() {
        let event = AdminAccessAuditEvent::failed(
            NonEmptyString::new("operator-1").unwrap_or_else(|_| unreachable!()),
            TenantId::new("tenant-ccc").unwrap_or_else(|_| unreachable!()),
            NonEmptyString::new("support ticket #42").unwrap_or_else(|_| unreachable!()),
            "connection reset",
        );

        assert_eq!(event.status(), AdminAccessStatus::Failed);
        assert_eq!(event.error_detail(), Some("connection reset"));
    }

    #[test]
    fn error_detail_is_rejected_on_non_failed_events() {
        let restored = AdminAccessAuditEvent::from_parts(
            Uuid::new_v4(),
            "operator-1",
            TenantId::new("tenant-ccc").unwrap_or_else(|_| unreachable!()),
            "support ticket #42",
            AdminAccessStatus::Success,
            Some("unexpected".to_owned()),
            Utc::now(),
        );

        assert!(restored.is_err());
    }
}
