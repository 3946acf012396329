use std::collections::HashSet;

use async_trait::async_trait;
use palisade_application::{
    AdminAuditQuery, AdminAuditRepository, ChangeStore, PendingChange, ReadOnlyTenantStore,
    RoleService, TenantReadRepository, UserDirectory, UserTenantLookup,
};
use palisade_core::{AppError, AppResult, TenantContext, TenantId};
use palisade_domain::{
    AdminAccessAuditEvent, EntityState, TenantRecord, TenantScoped, TenantUser, TodoId, TodoItem,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct TenantTables {
    users: Vec<TenantUser>,
    todos: Vec<TodoItem>,
}

/// In-memory implementation of every tenant isolation port.
///
/// Context reads behave like row-level security with an unset session
/// variable: an empty context sees no rows.
#[derive(Debug, Default)]
pub struct InMemoryTenantStore {
    tables: RwLock<TenantTables>,
    operator_roles: RwLock<HashSet<(String, String)>>,
    audit_events: RwLock<Vec<AdminAccessAuditEvent>>,
}

impl InMemoryTenantStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user directly, bypassing any tenant context.
    pub async fn insert_user(&self, user: TenantUser) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|existing| existing.external_subject() == user.external_subject())
        {
            return Err(AppError::Conflict(format!(
                "subject '{}' is already registered",
                user.external_subject().as_str()
            )));
        }

        tables.users.push(user);
        Ok(())
    }

    /// Grants an operator role.
    pub async fn grant_role(&self, subject: &str, role_name: &str) {
        self.operator_roles
            .write()
            .await
            .insert((subject.to_owned(), role_name.to_owned()));
    }

    /// Returns every audit event in append order.
    pub async fn audit_events(&self) -> Vec<AdminAccessAuditEvent> {
        self.audit_events.read().await.clone()
    }

    async fn users_of(&self, tenant_id: &TenantId) -> Vec<TenantUser> {
        let mut users: Vec<TenantUser> = self
            .tables
            .read()
            .await
            .users
            .iter()
            .filter(|user| user.tenant_id() == tenant_id)
            .cloned()
            .collect();
        users.sort_by(|left, right| left.display_name().as_str().cmp(right.display_name().as_str()));
        users
    }

    async fn todos_of(&self, tenant_id: &TenantId) -> Vec<TodoItem> {
        self.tables
            .read()
            .await
            .todos
            .iter()
            .filter(|todo| todo.tenant_id() == tenant_id)
            .cloned()
            .collect()
    }
}

fn apply_change(tables: &mut TenantTables, change: &PendingChange) -> AppResult<()> {
    let applied = match (&change.record, change.state) {
        (TenantRecord::User(user), EntityState::Added) => {
            if tables.users.iter().any(|existing| existing.id() == user.id()) {
                return Err(AppError::Conflict(format!("user '{}' already exists", user.id())));
            }
            tables.users.push(user.clone());
            true
        }
        (TenantRecord::User(user), EntityState::Modified) => {
            let stored = tables.users.iter_mut().find(|existing| {
                existing.id() == user.id() && existing.tenant_id() == user.tenant_id()
            });
            match stored {
                Some(existing) => {
                    *existing = user.clone();
                    true
                }
                None => false,
            }
        }
        (TenantRecord::User(user), EntityState::Deleted) => {
            let before = tables.users.len();
            tables.users.retain(|existing| {
                !(existing.id() == user.id() && existing.tenant_id() == user.tenant_id())
            });
            tables.users.len() != before
        }
        (TenantRecord::Todo(todo), EntityState::Added) => {
            if tables.todos.iter().any(|existing| existing.id() == todo.id()) {
                return Err(AppError::Conflict(format!("todo '{}' already exists", todo.id())));
            }
            tables.todos.push(todo.clone());
            true
        }
        (TenantRecord::Todo(todo), EntityState::Modified) => {
            let stored = tables.todos.iter_mut().find(|existing| {
                existing.id() == todo.id() && existing.tenant_id() == todo.tenant_id()
            });
            match stored {
                Some(existing) => {
                    *existing = todo.clone();
                    true
                }
                None => false,
            }
        }
        (TenantRecord::Todo(todo), EntityState::Deleted) => {
            let before = tables.todos.len();
            tables.todos.retain(|existing| {
                !(existing.id() == todo.id() && existing.tenant_id() == todo.tenant_id())
            });
            tables.todos.len() != before
        }
    };

    if !applied {
        return Err(AppError::NotFound(format!(
            "{} owned by tenant '{}' was not found for {}",
            change.record.entity_type(),
            change.record.tenant_id(),
            change.state
        )));
    }

    Ok(())
}

#[async_trait]
impl ChangeStore for InMemoryTenantStore {
    async fn apply(&self, _context: &TenantContext, changes: &[PendingChange]) -> AppResult<usize> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        for change in changes {
            apply_change(&mut staged, change)?;
        }

        *tables = staged;
        Ok(changes.len())
    }
}

#[async_trait]
impl TenantReadRepository for InMemoryTenantStore {
    async fn list_users(&self, context: &TenantContext) -> AppResult<Vec<TenantUser>> {
        match context.tenant_id() {
            Some(tenant_id) => Ok(self.users_of(tenant_id).await),
            None => Ok(Vec::new()),
        }
    }

    async fn list_todos(&self, context: &TenantContext) -> AppResult<Vec<TodoItem>> {
        match context.tenant_id() {
            Some(tenant_id) => Ok(self.todos_of(tenant_id).await),
            None => Ok(Vec::new()),
        }
    }

    async fn find_todo(
        &self,
        context: &TenantContext,
        todo_id: TodoId,
    ) -> AppResult<Option<TodoItem>> {
        let Some(tenant_id) = context.tenant_id() else {
            return Ok(None);
        };

        Ok(self
            .todos_of(tenant_id)
            .await
            .into_iter()
            .find(|todo| todo.id() == todo_id))
    }
}

#[async_trait]
impl ReadOnlyTenantStore for InMemoryTenantStore {
    async fn list_users(&self, tenant_id: &TenantId) -> AppResult<Vec<TenantUser>> {
        Ok(self.users_of(tenant_id).await)
    }

    async fn list_todos(&self, tenant_id: &TenantId) -> AppResult<Vec<TodoItem>> {
        Ok(self.todos_of(tenant_id).await)
    }
}

#[async_trait]
impl UserDirectory for InMemoryTenantStore {
    async fn lookup_tenant_by_subject(
        &self,
        subject: &str,
    ) -> AppResult<Option<UserTenantLookup>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|user| user.external_subject().as_str() == subject)
            .map(|user| UserTenantLookup {
                user_id: user.id(),
                tenant_id: user.tenant_id().clone(),
            }))
    }
}

#[async_trait]
impl RoleService for InMemoryTenantStore {
    async fn is_in_role(&self, actor_id: &str, role_name: &str) -> AppResult<bool> {
        Ok(self
            .operator_roles
            .read()
            .await
            .contains(&(actor_id.to_owned(), role_name.to_owned())))
    }
}

#[async_trait]
impl AdminAuditRepository for InMemoryTenantStore {
    async fn append_event(&self, event: AdminAccessAuditEvent) -> AppResult<()> {
        self.audit_events.write().await.push(event);
        Ok(())
    }

    async fn list_events(&self, query: AdminAuditQuery) -> AppResult<Vec<AdminAccessAuditEvent>> {
        let query = query.normalized();
        let events = self.audit_events.read().await;

        Ok(events
            .iter()
            .rev()
            .filter(|event| {
                query
                    .target_tenant_id
                    .as_ref()
                    .is_none_or(|tenant_id| event.target_tenant_id() == tenant_id)
            })
            .filter(|event| {
                query
                    .admin_user_id
                    .as_deref()
                    .is_none_or(|actor| event.admin_user_id().as_str() == actor)
            })
            .filter(|event| query.from.is_none_or(|from| event.occurred_at() >= from))
            .filter(|event| query.to.is_none_or(|to| event.occurred_at() < to))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}
