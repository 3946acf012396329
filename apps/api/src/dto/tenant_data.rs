mod conversions;
mod types;

pub use types::{CreateTodoRequest, TodoResponse, UpdateTodoRequest, UserResponse};
