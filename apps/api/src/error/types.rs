use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    /// Stable machine-readable error code.
    error: String,
    message: String,
}

impl ErrorResponse {
    pub(super) fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_owned(),
            message,
        }
    }
}
