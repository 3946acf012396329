use async_trait::async_trait;
use palisade_application::RoleService;
use palisade_core::{AppError, AppResult};
use sqlx::PgPool;

/// PostgreSQL-backed operator role membership.
///
/// Operator roles are global and not partitioned by tenant.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grants `role_name` to `subject`. Granting twice is a no-op.
    pub async fn grant_role(&self, subject: &str, role_name: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO operator_roles (subject, role_name)
            VALUES ($1, $2)
            ON CONFLICT (subject, role_name) DO NOTHING
            "#,
        )
        .bind(subject)
        .bind(role_name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to grant operator role: {error}")))?;

        Ok(())
    }
}

#[async_trait]
impl RoleService for PostgresRoleRepository {
    async fn is_in_role(&self, actor_id: &str, role_name: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM operator_roles
                WHERE subject = $1 AND role_name = $2
            )
            "#,
        )
        .bind(actor_id)
        .bind(role_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check operator role: {error}")))
    }
}
