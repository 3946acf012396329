use palisade_core::{AppError, AppResult, NonEmptyString, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TenantScoped;

/// Maximum accepted todo title length in characters.
pub const TODO_TITLE_MAX_LENGTH: usize = 200;

/// Unique identifier for a todo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a new random todo identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a todo identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A tenant-owned todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    id: TodoId,
    tenant_id: TenantId,
    title: NonEmptyString,
    completed: bool,
}

impl TodoItem {
    /// Creates a new, open todo stamped with the owning tenant.
    pub fn new(tenant_id: TenantId, title: impl Into<String>) -> AppResult<Self> {
        Self::from_parts(TodoId::new(), tenant_id, title, false)
    }

    /// Rebuilds a todo from persisted values.
    pub fn from_parts(
        id: TodoId,
        tenant_id: TenantId,
        title: impl Into<String>,
        completed: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            tenant_id,
            title: validate_title(title)?,
            completed,
        })
    }

    /// Returns the todo identifier.
    #[must_use]
    pub fn id(&self) -> TodoId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns whether the todo is done.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Replaces the title.
    pub fn rename(&mut self, title: impl Into<String>) -> AppResult<()> {
        self.title = validate_title(title)?;
        Ok(())
    }

    /// Marks the todo as done or open.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}

impl TenantScoped for TodoItem {
    fn entity_type(&self) -> &'static str {
        "todo"
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

fn validate_title(title: impl Into<String>) -> AppResult<NonEmptyString> {
    let title = NonEmptyString::new(title)?;
    if title.as_str().chars().count() > TODO_TITLE_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "todo title must not exceed {TODO_TITLE_MAX_LENGTH} characters"
        )));
    }

    Ok(title)
}

#[cfg(test)]
mod tests {
    use palisade_core::TenantId;
    use proptest::prelude::*;

    use super::{TODO_TITLE_MAX_LENGTH, TodoItem};

    fn tenant() -> TenantId {
        TenantId::new("tenant-aaa").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn new_todo_starts_open() {
        let todo = TodoItem::new(tenant(), "Write the runbook");
        assert!(todo.is_ok());
        assert!(!todo.unwrap_or_else(|_| unreachable!()).completed());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(TodoItem::new(tenant(), "   ").is_err());
    }

    #[test]
    fn rename_keeps_previous_title_on_error() {
        let mut todo = TodoItem::new(tenant(), "Draft").unwrap_or_else(|_| unreachable!());
        assert!(todo.rename("").is_err());
        assert_eq!(todo.title().as_str(), "Draft");
    }

    proptest! {
        #[test]
        fn title_length_limit_is_enforced(length in 1_usize..400) {
            let title = "x".repeat(length);
            let result = TodoItem::new(tenant(), title);
            prop_assert_eq!(result.is_ok(), length <= TODO_TITLE_MAX_LENGTH);
        }
    }
}
