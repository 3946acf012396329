use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use palisade_core::AppError;
use tracing::error;

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) | AppError::InvalidJustification(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired(_) | AppError::TenantClaimMissing(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::CrossTenantViolation { .. } | AppError::UnauthorizedAccess(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let payload = Json(ErrorResponse::new(self.0.code(), self.0.to_string()));

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use palisade_core::AppError;

    use super::ApiError;

    #[test]
    fn resolution_failures_are_unauthorized() {
        for error in [
            AppError::AuthenticationRequired("no token".to_owned()),
            AppError::TenantClaimMissing("no tenant".to_owned()),
        ] {
            assert_eq!(
                ApiError(error).into_response().status(),
                StatusCode::UNAUTHORIZED
            );
        }
    }

    #[test]
    fn isolation_failures_are_forbidden() {
        let violation = AppError::CrossTenantViolation {
            entity_type: "todo".to_owned(),
            entity_tenant_id: "tenant-bbb".to_owned(),
            acting_tenant_id: "tenant-aaa".to_owned(),
        };

        assert_eq!(
            ApiError(violation).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError(AppError::UnauthorizedAccess("not an operator".to_owned()))
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn missing_justification_is_a_bad_request() {
        assert_eq!(
            ApiError(AppError::InvalidJustification("reason required".to_owned()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
