use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{HealthDependencyStatus, HealthResponse, RlsHealthResponse};
use crate::state::AppState;

mod checks;
mod handlers;

pub use handlers::{health_handler, rls_health_handler};
