use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use palisade_core::TenantContext;
use palisade_domain::TodoId;
use uuid::Uuid;

use crate::dto::{CreateTodoRequest, TodoResponse, UpdateTodoRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_todos_handler(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
) -> ApiResult<Json<Vec<TodoResponse>>> {
    let todos = state
        .tenant_data_service
        .list_todos(&context)
        .await?
        .into_iter()
        .map(TodoResponse::from)
        .collect();

    Ok(Json(todos))
}

pub async fn create_todo_handler(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
    Json(payload): Json<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<TodoResponse>)> {
    let todo = state
        .tenant_data_service
        .create_todo(&context, payload.title.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

pub async fn update_todo_handler(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
    Path(todo_id): Path<Uuid>,
    Json(payload): Json<UpdateTodoRequest>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state
        .tenant_data_service
        .update_todo(&context, TodoId::from_uuid(todo_id), payload.into())
        .await?;

    Ok(Json(TodoResponse::from(todo)))
}

pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
    Path(todo_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .tenant_data_service
        .delete_todo(&context, TodoId::from_uuid(todo_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
