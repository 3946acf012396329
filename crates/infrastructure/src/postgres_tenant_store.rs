use async_trait::async_trait;
use palisade_application::{ChangeStore, PendingChange, ReadOnlyTenantStore, TenantReadRepository};
use palisade_core::{AppError, AppResult, TenantContext, TenantId};
use palisade_domain::{
    EntityState, TenantRecord, TenantScoped, TenantUser, TodoId, TodoItem, UserId,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::tenant_session::{TenantBoundPool, TenantTransaction};

/// PostgreSQL-backed store for tenant-owned users and todos.
///
/// Context reads filter on the context tenant in SQL and additionally rely on
/// row-level security bound through [`TenantBoundPool`].
#[derive(Clone)]
pub struct PostgresTenantStore {
    pool: TenantBoundPool,
}

impl PostgresTenantStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: TenantBoundPool::new(pool),
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: String,
    external_subject: String,
    email: String,
    display_name: String,
}

impl TryFrom<UserRow> for TenantUser {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        TenantUser::from_parts(
            UserId::from_uuid(row.id),
            TenantId::new(row.tenant_id)?,
            row.external_subject,
            row.email,
            row.display_name,
        )
    }
}

#[derive(Debug, FromRow)]
struct TodoRow {
    id: Uuid,
    tenant_id: String,
    title: String,
    completed: bool,
}

impl TryFrom<TodoRow> for TodoItem {
    type Error = AppError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        TodoItem::from_parts(
            TodoId::from_uuid(row.id),
            TenantId::new(row.tenant_id)?,
            row.title,
            row.completed,
        )
    }
}

// An unbound context binds NULL, which matches no rows.
const SELECT_USERS_SQL: &str = r#"
    SELECT id, tenant_id, external_subject, email, display_name
    FROM users
    WHERE tenant_id = $1
    ORDER BY display_name, id
"#;

const SELECT_TODOS_SQL: &str = r#"
    SELECT id, tenant_id, title, completed
    FROM todos
    WHERE tenant_id = $1
    ORDER BY created_at, id
"#;

async fn fetch_users(
    connection: &mut PgConnection,
    tenant_id: Option<&str>,
) -> AppResult<Vec<TenantUser>> {
    sqlx::query_as::<_, UserRow>(SELECT_USERS_SQL)
        .bind(tenant_id)
        .fetch_all(connection)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?
        .into_iter()
        .map(TenantUser::try_from)
        .collect()
}

async fn fetch_todos(
    connection: &mut PgConnection,
    tenant_id: Option<&str>,
) -> AppResult<Vec<TodoItem>> {
    sqlx::query_as::<_, TodoRow>(SELECT_TODOS_SQL)
        .bind(tenant_id)
        .fetch_all(connection)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list todos: {error}")))?
        .into_iter()
        .map(TodoItem::try_from)
        .collect()
}

#[async_trait]
impl TenantReadRepository for PostgresTenantStore {
    async fn list_users(&self, context: &TenantContext) -> AppResult<Vec<TenantUser>> {
        let mut connection = self.pool.acquire(context).await?;
        let tenant_id = context.tenant_id().map(TenantId::as_str);

        fetch_users(connection.command().await, tenant_id).await
    }

    async fn list_todos(&self, context: &TenantContext) -> AppResult<Vec<TodoItem>> {
        let mut connection = self.pool.acquire(context).await?;
        let tenant_id = context.tenant_id().map(TenantId::as_str);

        fetch_todos(connection.command().await, tenant_id).await
    }

    async fn find_todo(
        &self,
        context: &TenantContext,
        todo_id: TodoId,
    ) -> AppResult<Option<TodoItem>> {
        let mut connection = self.pool.acquire(context).await?;
        let tenant_id = context.tenant_id().map(TenantId::as_str);

        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, tenant_id, title, completed
            FROM todos
            WHERE id = $1
                AND tenant_id = $2
            "#,
        )
        .bind(todo_id.as_uuid())
        .bind(tenant_id)
        .fetch_optional(connection.command().await)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find todo: {error}")))?;

        row.map(TodoItem::try_from).transpose()
    }
}

#[async_trait]
impl ChangeStore for PostgresTenantStore {
    async fn apply(&self, context: &TenantContext, changes: &[PendingChange]) -> AppResult<usize> {
        let mut connection = self.pool.acquire(context).await?;
        let mut transaction = connection.begin().await?;

        let mut written = 0;
        for change in changes {
            written += apply_change(&mut transaction, change).await?;
        }

        transaction.commit().await?;
        Ok(written)
    }
}

async fn apply_change(
    transaction: &mut TenantTransaction<'_>,
    change: &PendingChange,
) -> AppResult<usize> {
    let query = match (&change.record, change.state) {
        (TenantRecord::User(user), EntityState::Added) => sqlx::query(
            r#"
            INSERT INTO users (id, tenant_id, external_subject, email, display_name)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.tenant_id().as_str())
        .bind(user.external_subject().as_str())
        .bind(user.email().as_str())
        .bind(user.display_name().as_str()),
        (TenantRecord::User(user), EntityState::Modified) => sqlx::query(
            r#"
            UPDATE users
            SET email = $3, display_name = $4, updated_at = now()
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.tenant_id().as_str())
        .bind(user.email().as_str())
        .bind(user.display_name().as_str()),
        (TenantRecord::User(user), EntityState::Deleted) => sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.tenant_id().as_str()),
        (TenantRecord::Todo(todo), EntityState::Added) => sqlx::query(
            r#"
            INSERT INTO todos (id, tenant_id, title, completed)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(todo.id().as_uuid())
        .bind(todo.tenant_id().as_str())
        .bind(todo.title().as_str())
        .bind(todo.completed()),
        (TenantRecord::Todo(todo), EntityState::Modified) => sqlx::query(
            r#"
            UPDATE todos
            SET title = $3, completed = $4, updated_at = now()
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(todo.id().as_uuid())
        .bind(todo.tenant_id().as_str())
        .bind(todo.title().as_str())
        .bind(todo.completed()),
        (TenantRecord::Todo(todo), EntityState::Deleted) => sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(todo.id().as_uuid())
        .bind(todo.tenant_id().as_str()),
    };

    let result = query.execute(transaction.command().await).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to apply {} {} change: {error}",
            change.state,
            change.record.entity_type()
        ))
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "{} owned by tenant '{}' was not found for {}",
            change.record.entity_type(),
            change.record.tenant_id(),
            change.state
        )));
    }

    Ok(result.rows_affected() as usize)
}

/// Read-only store used by administrative cross-tenant reads.
///
/// Every call runs in its own `READ ONLY` transaction with the target tenant
/// and the admin flag set transaction-locally.
#[derive(Clone)]
pub struct PostgresReadOnlyTenantStore {
    pool: PgPool,
}

impl PostgresReadOnlyTenantStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_admin_read(
        &self,
        tenant_id: &TenantId,
    ) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin admin read transaction: {error}"))
        })?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to mark admin read as read-only: {error}"))
            })?;

        sqlx::query(
            "SELECT set_config('app.current_tenant_id', $1, true), set_config('app.is_admin', 'true', true)",
        )
        .bind(tenant_id.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to bind admin read session: {error}"))
        })?;

        Ok(transaction)
    }
}

#[async_trait]
impl ReadOnlyTenantStore for PostgresReadOnlyTenantStore {
    async fn list_users(&self, tenant_id: &TenantId) -> AppResult<Vec<TenantUser>> {
        let mut transaction = self.begin_admin_read(tenant_id).await?;
        let users = fetch_users(&mut transaction, Some(tenant_id.as_str())).await?;
        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to finish admin read: {error}"))
        })?;

        Ok(users)
    }

    async fn list_todos(&self, tenant_id: &TenantId) -> AppResult<Vec<TodoItem>> {
        let mut transaction = self.begin_admin_read(tenant_id).await?;
        let todos = fetch_todos(&mut transaction, Some(tenant_id.as_str())).await?;
        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to finish admin read: {error}"))
        })?;

        Ok(todos)
    }
}
