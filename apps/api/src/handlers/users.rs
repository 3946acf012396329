use axum::Json;
use axum::extract::{Extension, State};
use palisade_core::TenantContext;

use crate::dto::UserResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(context): Extension<TenantContext>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .tenant_data_service
        .list_users(&context)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}
