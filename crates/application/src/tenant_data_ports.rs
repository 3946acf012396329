use async_trait::async_trait;
use palisade_core::{AppResult, TenantContext};
use palisade_domain::{EntityState, TenantRecord, TenantUser, TodoId, TodoItem};

/// Entity registered with a unit of work together with its change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    /// Kind of write to perform.
    pub state: EntityState,
    /// Record to write.
    pub record: TenantRecord,
}

/// Port applying a batch of tenant-scoped changes.
#[async_trait]
pub trait ChangeStore: Send + Sync {
    /// Applies every change atomically and returns the number of rows written.
    ///
    /// Either all changes are persisted or none are.
    async fn apply(&self, context: &TenantContext, changes: &[PendingChange]) -> AppResult<usize>;
}

/// Port for tenant-scoped reads under the request's tenant context.
#[async_trait]
pub trait TenantReadRepository: Send + Sync {
    /// Lists users visible to the context tenant.
    async fn list_users(&self, context: &TenantContext) -> AppResult<Vec<TenantUser>>;

    /// Lists todos visible to the context tenant.
    async fn list_todos(&self, context: &TenantContext) -> AppResult<Vec<TodoItem>>;

    /// Finds one todo visible to the context tenant.
    async fn find_todo(
        &self,
        context: &TenantContext,
        todo_id: TodoId,
    ) -> AppResult<Option<TodoItem>>;
}
