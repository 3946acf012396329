use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, put};
use palisade_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let tenant_routes = Router::new()
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/todos",
            get(handlers::todos::list_todos_handler).post(handlers::todos::create_todo_handler),
        )
        .route(
            "/api/todos/{todo_id}",
            put(handlers::todos::update_todo_handler).delete(handlers::todos::delete_todo_handler),
        );

    let admin_routes = Router::new()
        .route(
            "/api/admin/tenants/{tenant_id}/users",
            get(handlers::admin::admin_list_tenant_users_handler),
        )
        .route(
            "/api/admin/tenants/{tenant_id}/todos",
            get(handlers::admin::admin_list_tenant_todos_handler),
        )
        .route(
            "/api/admin/audit-events",
            get(handlers::admin::admin_audit_events_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/health/rls", get(handlers::health::rls_health_handler))
        .merge(tenant_routes)
        .merge(admin_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_tenant,
        ))
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
