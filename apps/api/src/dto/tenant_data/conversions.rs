use palisade_application::UpdateTodoInput;
use palisade_domain::{TenantScoped, TenantUser, TodoItem};

use super::types::{TodoResponse, UpdateTodoRequest, UserResponse};

impl From<TenantUser> for UserResponse {
    fn from(user: TenantUser) -> Self {
        Self {
            id: user.id().to_string(),
            tenant_id: user.tenant_id().to_string(),
            email: user.email().as_str().to_owned(),
            display_name: user.display_name().as_str().to_owned(),
        }
    }
}

impl From<TodoItem> for TodoResponse {
    fn from(todo: TodoItem) -> Self {
        Self {
            id: todo.id().to_string(),
            tenant_id: todo.tenant_id().to_string(),
            title: todo.title().as_str().to_owned(),
            completed: todo.completed(),
        }
    }
}

impl From<UpdateTodoRequest> for UpdateTodoInput {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            title: request.title,
            completed: request.completed,
        }
    }
}
