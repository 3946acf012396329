//! Shared primitives for all Rust crates in Palisade.

#![forbid(unsafe_code)]

/// Verified identity claims consumed from the authentication layer.
pub mod auth;
/// Request-scoped tenant context.
pub mod tenant_context;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::IdentityClaims;
pub use tenant_context::TenantContext;

/// Result type used across Palisade crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Tenant identifier used as the partition key for every persisted resource.
///
/// Identifiers are opaque strings issued by the identity provider and compared
/// ordinally. Surrounding whitespace is never trimmed away.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant identifier, rejecting empty or whitespace-only values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "tenant id must not be empty".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for TenantId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

impl Display for TenantId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request reached a tenant-scoped path without verified identity.
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    /// Request is authenticated but no tenant could be resolved for it.
    #[error("tenant claim missing: {0}")]
    TenantClaimMissing(String),

    /// A pending write touches a row owned by a different tenant.
    #[error(
        "cross-tenant violation: {entity_type} owned by tenant '{entity_tenant_id}' cannot be changed from tenant '{acting_tenant_id}'"
    )]
    CrossTenantViolation {
        /// Entity type of the offending row.
        entity_type: String,
        /// Tenant that owns the row.
        entity_tenant_id: String,
        /// Tenant of the current request context.
        acting_tenant_id: String,
    },

    /// Administrative bypass invoked by an actor without the admin role.
    #[error("unauthorized access: {0}")]
    UnauthorizedAccess(String),

    /// Administrative bypass invoked without an audit justification.
    #[error("invalid justification: {0}")]
    InvalidJustification(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable machine-readable code for this error category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationFailed",
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::AuthenticationRequired(_) => "AuthenticationRequired",
            Self::TenantClaimMissing(_) => "TenantClaimMissing",
            Self::CrossTenantViolation { .. } => "CrossTenantViolation",
            Self::UnauthorizedAccess(_) => "UnauthorizedAccess",
            Self::InvalidJustification(_) => "InvalidJustification",
            Self::Internal(_) => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString, TenantId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn tenant_id_rejects_blank_values() {
        assert!(TenantId::new("").is_err());
        assert!(TenantId::new(" \t").is_err());
    }

    #[test]
    fn tenant_id_comparison_is_ordinal() {
        let lower = TenantId::new("tenant-aaa");
        let upper = TenantId::new("TENANT-AAA");
        assert!(lower.is_ok() && upper.is_ok());
        assert_ne!(
            lower.unwrap_or_else(|_| unreachable!()),
            upper.unwrap_or_else(|_| unreachable!())
        );
    }

    #[test]
    fn resolution_errors_have_distinct_codes() {
        let unauthenticated = AppError::AuthenticationRequired("no token".to_owned());
        let missing_tenant = AppError::TenantClaimMissing("no tenant".to_owned());

        assert_eq!(unauthenticated.code(), "AuthenticationRequired");
        assert_eq!(missing_tenant.code(), "TenantClaimMissing");
    }
}
