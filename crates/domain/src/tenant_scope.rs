use std::fmt::{Display, Formatter};

use palisade_core::TenantId;
use serde::{Deserialize, Serialize};

use crate::{TenantUser, TodoItem};

/// Capability of a persisted record owned by exactly one tenant.
///
/// The owning tenant is assigned when the record is created and ordinary code
/// has no way to reassign it.
pub trait TenantScoped {
    /// Stable entity type label used in diagnostics and error payloads.
    fn entity_type(&self) -> &'static str;

    /// Tenant that owns this record.
    fn tenant_id(&self) -> &TenantId;
}

/// Change state of an entity tracked by a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    /// New row to be inserted.
    Added,
    /// Existing row to be updated.
    Modified,
    /// Existing row to be removed.
    Deleted,
}

impl EntityState {
    /// Returns a stable label for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }

    /// Returns whether the change targets a row that already exists.
    #[must_use]
    pub fn touches_existing_row(&self) -> bool {
        matches!(self, Self::Modified | Self::Deleted)
    }
}

impl Display for EntityState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Closed set of tenant-scoped records a unit of work can persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TenantRecord {
    /// A tenant user.
    User(TenantUser),
    /// A todo item.
    Todo(TodoItem),
}

impl TenantRecord {
    fn as_scoped(&self) -> &dyn TenantScoped {
        match self {
            Self::User(user) => user,
            Self::Todo(todo) => todo,
        }
    }
}

impl TenantScoped for TenantRecord {
    fn entity_type(&self) -> &'static str {
        self.as_scoped().entity_type()
    }

    fn tenant_id(&self) -> &TenantId {
        self.as_scoped().tenant_id()
    }
}

impl From<TenantUser> for TenantRecord {
    fn from(value: TenantUser) -> Self {
        Self::User(value)
    }
}

impl From<TodoItem> for TenantRecord {
    fn from(value: TodoItem) -> Self {
        Self::Todo(value)
    }
}

#[cfg(test)]
mod tests {
    use palisade_core::TenantId;

    use super::{EntityState, TenantRecord, TenantScoped};
    use crate::TodoItem;

    #[test]
    fn only_modified_and_deleted_touch_existing_rows() {
        assert!(!EntityState::Added.touches_existing_row());
        assert!(EntityState::Modified.touches_existing_row());
        assert!(EntityState::Deleted.touches_existing_row());
    }

    #[test]
    fn record_delegates_to_wrapped_entity() {
        let tenant_id = TenantId::new("tenant-aaa").unwrap_or_else(|_| unreachable!());
        let todo = TodoItem::new(tenant_id, "Ship it").unwrap_or_else(|_| unreachable!());
        let record = TenantRecord::from(todo);

        assert_eq!(record.entity_type(), "todo");
        assert_eq!(record.tenant_id().as_str(), "tenant-aaa");
    }
}
