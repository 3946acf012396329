use std::sync::Arc;

use palisade_core::{AppError, AppResult, TenantContext};
use palisade_domain::{TenantUser, TodoId, TodoItem};

use crate::{ChangeStore, TenantReadRepository, UnitOfWork};

/// Input payload for todo updates. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTodoInput {
    /// New title.
    pub title: Option<String>,
    /// New completion flag.
    pub completed: Option<bool>,
}

/// Application service for tenant-scoped data behind the request context.
#[derive(Clone)]
pub struct TenantDataService {
    read_repository: Arc<dyn TenantReadRepository>,
    change_store: Arc<dyn ChangeStore>,
}

impl TenantDataService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        read_repository: Arc<dyn TenantReadRepository>,
        change_store: Arc<dyn ChangeStore>,
    ) -> Self {
        Self {
            read_repository,
            change_store,
        }
    }

    /// Lists users of the acting tenant.
    pub async fn list_users(&self, context: &TenantContext) -> AppResult<Vec<TenantUser>> {
        self.read_repository.list_users(context).await
    }

    /// Lists todos of the acting tenant.
    pub async fn list_todos(&self, context: &TenantContext) -> AppResult<Vec<TodoItem>> {
        self.read_repository.list_todos(context).await
    }

    /// Creates a todo owned by the acting tenant.
    pub async fn create_todo(&self, context: &TenantContext, title: &str) -> AppResult<TodoItem> {
        let tenant_id = context.tenant_id().cloned().ok_or_else(|| {
            AppError::TenantClaimMissing("creating a todo requires a tenant context".to_owned())
        })?;
        let todo = TodoItem::new(tenant_id, title)?;

        let mut unit_of_work = UnitOfWork::new(context, self.change_store.clone());
        unit_of_work.register_added(todo.clone());
        unit_of_work.commit().await?;

        Ok(todo)
    }

    /// Applies a partial update to a todo of the acting tenant.
    pub async fn update_todo(
        &self,
        context: &TenantContext,
        todo_id: TodoId,
        input: UpdateTodoInput,
    ) -> AppResult<TodoItem> {
        let mut todo = self.require_todo(context, todo_id).await?;
        if let Some(title) = input.title {
            todo.rename(title)?;
        }
        if let Some(completed) = input.completed {
            todo.set_completed(completed);
        }

        let mut unit_of_work = UnitOfWork::new(context, self.change_store.clone());
        unit_of_work.register_modified(todo.clone());
        unit_of_work.commit().await?;

        Ok(todo)
    }

    /// Deletes a todo of the acting tenant.
    pub async fn delete_todo(&self, context: &TenantContext, todo_id: TodoId) -> AppResult<()> {
        let todo = self.require_todo(context, todo_id).await?;

        let mut unit_of_work = UnitOfWork::new(context, self.change_store.clone());
        unit_of_work.register_deleted(todo);
        unit_of_work.commit().await?;

        Ok(())
    }

    async fn require_todo(&self, context: &TenantContext, todo_id: TodoId) -> AppResult<TodoItem> {
        self.read_repository
            .find_todo(context, todo_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("todo '{todo_id}' does not exist")))
    }
}
