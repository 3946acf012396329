use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a tenant user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub tenant_id: String,
    pub email: String,
    pub display_name: String,
}

/// API representation of a todo item.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/todo-response.ts"
)]
pub struct TodoResponse {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub completed: bool,
}

/// Incoming payload for todo creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-todo-request.ts"
)]
pub struct CreateTodoRequest {
    pub title: String,
}

/// Incoming payload for todo updates. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-todo-request.ts"
)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}
