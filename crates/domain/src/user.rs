//! Tenant user directory entries.

use palisade_core::{AppError, AppResult, NonEmptyString, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TenantScoped;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, lowercased email address.
    ///
    /// Only structural checks are applied: one `@`, a non-empty local part and
    /// a dotted domain.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain an '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must have exactly one '@' and a local part".to_owned(),
            ));
        }

        if !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// A user belonging to exactly one tenant.
///
/// `external_subject` is the identity provider's stable `sub` value and is what
/// the tenant resolver falls back to when a token carries no tenant claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantUser {
    id: UserId,
    tenant_id: TenantId,
    external_subject: NonEmptyString,
    email: EmailAddress,
    display_name: NonEmptyString,
}

impl TenantUser {
    /// Creates a new user stamped with the owning tenant.
    pub fn new(
        tenant_id: TenantId,
        external_subject: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AppResult<Self> {
        Self::from_parts(
            UserId::new(),
            tenant_id,
            external_subject,
            email,
            display_name,
        )
    }

    /// Rebuilds a user from persisted values.
    pub fn from_parts(
        id: UserId,
        tenant_id: TenantId,
        external_subject: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            tenant_id,
            external_subject: NonEmptyString::new(external_subject)?,
            email: EmailAddress::new(email)?,
            display_name: NonEmptyString::new(display_name)?,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the identity provider subject.
    #[must_use]
    pub fn external_subject(&self) -> &NonEmptyString {
        &self.external_subject
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Updates the display name.
    pub fn rename(&mut self, display_name: impl Into<String>) -> AppResult<()> {
        self.display_name = NonEmptyString::new(display_name)?;
        Ok(())
    }
}

impl TenantScoped for TenantUser {
    fn entity_type(&self) -> &'static str {
        "user"
    }

    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(value: &str) -> TenantId {
        TenantId::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn valid_email_is_normalized() {
        let email = EmailAddress::new("USER@Example.COM");
        assert!(email.is_ok());
        assert_eq!(
            email.unwrap_or_else(|_| panic!("test")).as_str(),
            "user@example.com"
        );
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(EmailAddress::new("noatsign").is_err());
    }

    #[test]
    fn email_with_two_ats_is_rejected() {
        assert!(EmailAddress::new("a@b@example.com").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@nodot").is_err());
    }

    #[test]
    fn user_carries_owning_tenant() {
        let user = TenantUser::new(tenant("tenant-aaa"), "sub-1", "a@example.com", "Ada");
        assert!(user.is_ok());

        let user = user.unwrap_or_else(|_| unreachable!());
        assert_eq!(user.tenant_id().as_str(), "tenant-aaa");
        assert_eq!(user.entity_type(), "user");
    }

    #[test]
    fn user_requires_subject_and_display_name() {
        assert!(TenantUser::new(tenant("tenant-aaa"), " ", "a@example.com", "Ada").is_err());
        assert!(TenantUser::new(tenant("tenant-aaa"), "sub-1", "a@example.com", "").is_err());
    }
}
