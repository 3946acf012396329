use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use palisade_application::{AdminAuditQuery, AdminAuditRepository};
use palisade_core::{AppError, AppResult, TenantId};
use palisade_domain::{AdminAccessAuditEvent, AdminAccessStatus};

/// PostgreSQL-backed append-only log of administrative tenant access.
///
/// The table is global and carries no row-level security policy.
#[derive(Clone)]
pub struct PostgresAdminAuditRepository {
    pool: PgPool,
}

impl PostgresAdminAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AdminAccessAuditRow {
    event_id: Uuid,
    admin_user_id: String,
    target_tenant_id: String,
    reason: String,
    status: String,
    error_detail: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<AdminAccessAuditRow> for AdminAccessAuditEvent {
    type Error = AppError;

    fn try_from(row: AdminAccessAuditRow) -> Result<Self, Self::Error> {
        AdminAccessAuditEvent::from_parts(
            row.event_id,
            row.admin_user_id,
            TenantId::new(row.target_tenant_id)?,
            row.reason,
            AdminAccessStatus::from_str(row.status.as_str())?,
            row.error_detail,
            row.occurred_at,
        )
    }
}

#[async_trait]
impl AdminAuditRepository for PostgresAdminAuditRepository {
    async fn append_event(&self, event: AdminAccessAuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_access_audit_events (
                event_id,
                admin_user_id,
                target_tenant_id,
                reason,
                status,
                error_detail,
                occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.event_id())
        .bind(event.admin_user_id().as_str())
        .bind(event.target_tenant_id().as_str())
        .bind(event.reason().as_str())
        .bind(event.status().as_str())
        .bind(event.error_detail())
        .bind(event.occurred_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to append admin access audit event: {error}"))
        })?;

        Ok(())
    }

    async fn list_events(&self, query: AdminAuditQuery) -> AppResult<Vec<AdminAccessAuditEvent>> {
        let query = query.normalized();
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, AdminAccessAuditRow>(
            r#"
            SELECT
                event_id,
                admin_user_id,
                target_tenant_id,
                reason,
                status,
                error_detail,
                occurred_at
            FROM admin_access_audit_events
            WHERE ($1::TEXT IS NULL OR target_tenant_id = $1)
                AND ($2::TEXT IS NULL OR admin_user_id = $2)
                AND ($3::TIMESTAMPTZ IS NULL OR occurred_at >= $3)
                AND ($4::TIMESTAMPTZ IS NULL OR occurred_at < $4)
            ORDER BY occurred_at DESC, event_id
            LIMIT $5
            OFFSET $6
            "#,
        )
        .bind(query.target_tenant_id.as_ref().map(TenantId::as_str))
        .bind(query.admin_user_id)
        .bind(query.from)
        .bind(query.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list admin access audit events: {error}"))
        })?;

        rows.into_iter()
            .map(AdminAccessAuditEvent::try_from)
            .collect()
    }
}
