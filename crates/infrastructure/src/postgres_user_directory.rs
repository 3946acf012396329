use async_trait::async_trait;
use palisade_application::{UserDirectory, UserTenantLookup};
use palisade_core::{AppError, AppResult, TenantId};
use palisade_domain::UserId;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed user directory used as the tenant resolution fallback.
///
/// Runs before any tenant is known, so it goes through the
/// `lookup_tenant_by_subject` database function instead of the tenant-bound pool.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn lookup_tenant_by_subject(
        &self,
        subject: &str,
    ) -> AppResult<Option<UserTenantLookup>> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT id, tenant_id
            FROM lookup_tenant_by_subject($1)
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to look up tenant for subject: {error}"))
        })?;

        let Some((user_id, tenant_id)) = row else {
            return Ok(None);
        };

        Ok(Some(UserTenantLookup {
            user_id: UserId::from_uuid(user_id),
            tenant_id: TenantId::new(tenant_id)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use palisade_application::{ChangeStore, PendingChange, UserDirectory};
    use palisade_core::TenantContext;
    use palisade_domain::{EntityState, TenantRecord, TenantUser};

    use crate::PostgresTenantStore;
    use crate::test_support::{test_pool, unique_tenant};

    use super::PostgresUserDirectory;

    #[tokio::test]
    async fn subject_resolves_to_owning_tenant() {
        let Some(pool) = test_pool(2).await else {
            return;
        };
        let tenant_bbb = unique_tenant("tenant-bbb");
        let subject = format!("sub-123-{}", uuid::Uuid::new_v4());
        let user = TenantUser::new(tenant_bbb.clone(), subject.as_str(), "bob@example.com", "Bob")
            .unwrap_or_else(|_| unreachable!());
        let seeded = PostgresTenantStore::new(pool.clone())
            .apply(
                &TenantContext::for_tenant(tenant_bbb.clone()),
                &[PendingChange {
                    state: EntityState::Added,
                    record: TenantRecord::from(user.clone()),
                }],
            )
            .await;
        assert!(seeded.is_ok());

        let directory = PostgresUserDirectory::new(pool);
        let lookup = directory.lookup_tenant_by_subject(subject.as_str()).await;
        let missing = directory.lookup_tenant_by_subject("sub-nobody").await;

        let lookup = lookup.unwrap_or_default();
        assert_eq!(lookup.as_ref().map(|found| &found.tenant_id), Some(&tenant_bbb));
        assert_eq!(lookup.map(|found| found.user_id), Some(user.id()));
        assert!(missing.is_ok_and(|found| found.is_none()));
    }
}
