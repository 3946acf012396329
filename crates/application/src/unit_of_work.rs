use std::sync::Arc;

use palisade_core::{AppResult, TenantContext};
use palisade_domain::{EntityState, TenantRecord};

use crate::{ChangeStore, PendingChange, WriteScopeGuard};

/// Batch of tenant-scoped changes flushed together.
pub struct UnitOfWork {
    context: TenantContext,
    store: Arc<dyn ChangeStore>,
    changes: Vec<PendingChange>,
}

impl UnitOfWork {
    /// Starts an empty unit of work for the request context.
    #[must_use]
    pub fn new(context: &TenantContext, store: Arc<dyn ChangeStore>) -> Self {
        Self {
            context: context.clone(),
            store,
            changes: Vec::new(),
        }
    }

    /// Tracks a new record.
    pub fn register_added(&mut self, record: impl Into<TenantRecord>) {
        self.track(EntityState::Added, record.into());
    }

    /// Tracks an update to an existing record.
    pub fn register_modified(&mut self, record: impl Into<TenantRecord>) {
        self.track(EntityState::Modified, record.into());
    }

    /// Tracks removal of an existing record.
    pub fn register_deleted(&mut self, record: impl Into<TenantRecord>) {
        self.track(EntityState::Deleted, record.into());
    }

    /// Returns the tracked changes in registration order.
    #[must_use]
    pub fn pending(&self) -> &[PendingChange] {
        &self.changes
    }

    /// Validates and applies every tracked change.
    ///
    /// The write scope guard runs before the store sees any change, so a
    /// rejected batch writes nothing.
    pub async fn commit(self) -> AppResult<usize> {
        if self.changes.is_empty() {
            return Ok(0);
        }

        WriteScopeGuard::validate(&self.context, &self.changes)?;
        self.store.apply(&self.context, &self.changes).await
    }

    fn track(&mut self, state: EntityState, record: TenantRecord) {
        self.changes.push(PendingChange { state, record });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use palisade_core::{AppError, AppResult, TenantContext, TenantId};
    use palisade_domain::{EntityState, TodoItem};
    use tokio::sync::Mutex;

    use crate::{ChangeStore, PendingChange};

    use super::UnitOfWork;

    #[derive(Default)]
    struct RecordingChangeStore {
        applied: Mutex<Vec<PendingChange>>,
    }

    #[async_trait]
    impl ChangeStore for RecordingChangeStore {
        async fn apply(
            &self,
            _context: &TenantContext,
            changes: &[PendingChange],
        ) -> AppResult<usize> {
            self.applied.lock().await.extend(changes.iter().cloned());
            Ok(changes.len())
        }
    }

    fn tenant(value: &str) -> TenantId {
        TenantId::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn todo(owner: &str, title: &str) -> TodoItem {
        TodoItem::new(tenant(owner), title).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn commit_applies_changes_in_order() {
        let store = Arc::new(RecordingChangeStore::default());
        let context = TenantContext::for_tenant(tenant("tenant-aaa"));
        let mut unit_of_work = UnitOfWork::new(&context, store.clone());

        unit_of_work.register_added(todo("tenant-aaa", "first"));
        unit_of_work.register_modified(todo("tenant-aaa", "second"));

        let written = unit_of_work.commit().await;

        assert_eq!(written.unwrap_or_default(), 2);
        let applied = store.applied.lock().await;
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].state, EntityState::Added);
        assert_eq!(applied[1].state, EntityState::Modified);
    }

    #[tokio::test]
    async fn cross_tenant_batch_writes_nothing() {
        let store = Arc::new(RecordingChangeStore::default());
        let context = TenantContext::for_tenant(tenant("tenant-aaa"));
        let mut unit_of_work = UnitOfWork::new(&context, store.clone());

        unit_of_work.register_added(todo("tenant-aaa", "legit"));
        unit_of_work.register_deleted(todo("tenant-bbb", "foreign"));

        let result = unit_of_work.commit().await;

        assert!(matches!(
            result,
            Err(AppError::CrossTenantViolation { .. })
        ));
        assert!(store.applied.lock().await.is_empty());
    }

    #[tokio::test]
    async fn background_context_writes_without_tenant_check() {
        let store = Arc::new(RecordingChangeStore::default());
        let mut unit_of_work = UnitOfWork::new(&TenantContext::new(), store.clone());

        unit_of_work.register_modified(todo("tenant-bbb", "maintenance"));

        assert!(unit_of_work.commit().await.is_ok());
        assert_eq!(store.applied.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_commit_skips_the_store() {
        let store = Arc::new(RecordingChangeStore::default());
        let unit_of_work = UnitOfWork::new(&TenantContext::new(), store.clone());

        assert_eq!(unit_of_work.commit().await.unwrap_or(usize::MAX), 0);
        assert!(store.applied.lock().await.is_empty());
    }
}
