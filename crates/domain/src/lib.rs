//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod security;
mod tenant_scope;
mod todo;
mod user;

pub use security::{AdminAccessAuditEvent, AdminAccessStatus};
pub use tenant_scope::{EntityState, TenantRecord, TenantScoped};
pub use todo::{TODO_TITLE_MAX_LENGTH, TodoId, TodoItem};
pub use user::{EmailAddress, TenantUser, UserId};
