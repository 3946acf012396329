mod admin;
mod common;
mod tenant_data;

pub use admin::{AdminAccessAuditEventResponse, AdminAuditEventsQuery, AdminReadQuery};
pub use common::{HealthDependencyStatus, HealthResponse, RlsHealthResponse};
pub use tenant_data::{CreateTodoRequest, TodoResponse, UpdateTodoRequest, UserResponse};
