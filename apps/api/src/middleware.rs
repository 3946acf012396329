use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use palisade_core::{IdentityClaims, TenantContext};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Attaches verified claims to the request when a valid bearer token is sent.
///
/// Requests without a usable token continue unauthenticated; tenant resolution
/// decides whether the path requires identity.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.token_verifier.verify(token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(error) => {
                debug!(%error, path = request.uri().path(), "ignoring unverifiable bearer token");
            }
        }
    }

    next.run(request).await
}

/// Resolves the acting tenant and stores a fresh [`TenantContext`] in the
/// request extensions. Bypassed paths and tenantless operator requests
/// receive an empty context.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let context = TenantContext::new();
    let claims = request.extensions().get::<IdentityClaims>().cloned();

    state
        .tenant_resolution_service
        .resolve_into(request.uri().path(), claims.as_ref(), &context)
        .await?;

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
