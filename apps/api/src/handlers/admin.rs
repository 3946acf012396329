use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use palisade_application::AdminAuditQuery;
use palisade_core::IdentityClaims;

use crate::dto::{
    AdminAccessAuditEventResponse, AdminAuditEventsQuery, AdminReadQuery, TodoResponse,
    UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Operator identity is the verified subject claim. A missing subject is
/// passed through as blank and rejected by the admin service.
fn actor_id(claims: Option<&Extension<IdentityClaims>>) -> &str {
    match claims {
        Some(Extension(claims)) => claims.subject().unwrap_or_default(),
        None => "",
    }
}

pub async fn admin_list_tenant_users_handler(
    State(state): State<AppState>,
    claims: Option<Extension<IdentityClaims>>,
    Path(tenant_id): Path<String>,
    Query(query): Query<AdminReadQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .admin_read_access_service
        .execute_read_only(
            actor_id(claims.as_ref()),
            tenant_id.as_str(),
            query.reason.as_deref().unwrap_or_default(),
            |scope| async move { scope.list_users().await },
        )
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn admin_list_tenant_todos_handler(
    State(state): State<AppState>,
    claims: Option<Extension<IdentityClaims>>,
    Path(tenant_id): Path<String>,
    Query(query): Query<AdminReadQuery>,
) -> ApiResult<Json<Vec<TodoResponse>>> {
    let todos = state
        .admin_read_access_service
        .execute_read_only(
            actor_id(claims.as_ref()),
            tenant_id.as_str(),
            query.reason.as_deref().unwrap_or_default(),
            |scope| async move { scope.list_todos().await },
        )
        .await?
        .into_iter()
        .map(TodoResponse::from)
        .collect();

    Ok(Json(todos))
}

pub async fn admin_audit_events_handler(
    State(state): State<AppState>,
    claims: Option<Extension<IdentityClaims>>,
    Query(query): Query<AdminAuditEventsQuery>,
) -> ApiResult<Json<Vec<AdminAccessAuditEventResponse>>> {
    let events = state
        .admin_read_access_service
        .list_audit_events(actor_id(claims.as_ref()), AdminAuditQuery::try_from(query)?)
        .await?
        .into_iter()
        .map(AdminAccessAuditEventResponse::from)
        .collect();

    Ok(Json(events))
}
