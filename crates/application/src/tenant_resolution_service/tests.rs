use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use palisade_core::{AppError, AppResult, IdentityClaims, TenantContext, TenantId};
use palisade_domain::UserId;
use proptest::prelude::*;
use tokio::sync::Mutex;

use crate::{UserDirectory, UserTenantLookup};

use super::{TenantResolution, TenantResolutionService, TenantResolutionSettings};

#[derive(Default)]
struct FakeUserDirectory {
    tenants_by_subject: HashMap<String, String>,
    unavailable: bool,
    lookups: Mutex<Vec<String>>,
}

impl FakeUserDirectory {
    fn with_user(subject: &str, tenant_id: &str) -> Self {
        Self {
            tenants_by_subject: HashMap::from([(subject.to_owned(), tenant_id.to_owned())]),
            ..Self::default()
        }
    }

    fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn lookup_tenant_by_subject(
        &self,
        subject: &str,
    ) -> AppResult<Option<UserTenantLookup>> {
        self.lookups.lock().await.push(subject.to_owned());

        if self.unavailable {
            return Err(AppError::Internal("directory unavailable".to_owned()));
        }

        let Some(tenant_id) = self.tenants_by_subject.get(subject) else {
            return Ok(None);
        };

        Ok(Some(UserTenantLookup {
            user_id: UserId::new(),
            tenant_id: TenantId::new(tenant_id.as_str())?,
        }))
    }
}

fn service(directory: Arc<FakeUserDirectory>) -> TenantResolutionService {
    TenantResolutionService::new(TenantResolutionSettings::default(), directory)
}

fn resolved(value: &str) -> TenantResolution {
    TenantResolution::Resolved(TenantId::new(value).unwrap_or_else(|_| unreachable!()))
}

#[tokio::test]
async fn primary_claim_resolves_without_lookup() {
    let directory = Arc::new(FakeUserDirectory::with_user("sub-123", "tenant-bbb"));
    let service = service(directory.clone());
    let claims = IdentityClaims::from_pairs([("sub", "sub-123"), ("tenant_id", "tenant-aaa")]);

    let resolution = service.resolve("/api/todos", Some(&claims)).await;

    assert_eq!(
        resolution.unwrap_or_else(|_| unreachable!()),
        resolved("tenant-aaa")
    );
    assert!(directory.lookups.lock().await.is_empty());
}

#[tokio::test]
async fn alternate_claim_is_used_when_primary_is_blank() {
    let directory = Arc::new(FakeUserDirectory::default());
    let service = service(directory.clone());
    let claims = IdentityClaims::from_pairs([
        ("sub", "sub-123"),
        ("tenant_id", " "),
        ("tid", "tenant-alt"),
    ]);

    let resolution = service.resolve("/api/todos", Some(&claims)).await;

    assert_eq!(
        resolution.unwrap_or_else(|_| unreachable!()),
        resolved("tenant-alt")
    );
    assert!(directory.lookups.lock().await.is_empty());
}

#[tokio::test]
async fn subject_lookup_is_the_fallback() {
    let directory = Arc::new(FakeUserDirectory::with_user("sub-123", "tenant-bbb"));
    let service = service(directory.clone());
    let claims = IdentityClaims::from_pairs([("sub", "sub-123")]);

    let resolution = service.resolve("/api/users", Some(&claims)).await;

    assert_eq!(
        resolution.unwrap_or_else(|_| unreachable!()),
        resolved("tenant-bbb")
    );
    assert_eq!(directory.lookups.lock().await.as_slice(), ["sub-123"]);
}

#[tokio::test]
async fn unknown_subject_fails_with_tenant_claim_missing() {
    let service = service(Arc::new(FakeUserDirectory::default()));
    let claims = IdentityClaims::from_pairs([("sub", "sub-unknown")]);

    let resolution = service.resolve("/api/users", Some(&claims)).await;

    assert!(matches!(resolution, Err(AppError::TenantClaimMissing(_))));
}

#[tokio::test]
async fn directory_failure_is_treated_as_not_found() {
    let directory = Arc::new(FakeUserDirectory::unavailable());
    let service = service(directory.clone());
    let claims = IdentityClaims::from_pairs([("sub", "sub-123")]);

    let resolution = service.resolve("/api/users", Some(&claims)).await;

    assert!(matches!(resolution, Err(AppError::TenantClaimMissing(_))));
    assert_eq!(directory.lookups.lock().await.len(), 1);
}

#[tokio::test]
async fn claims_without_subject_skip_the_lookup() {
    let directory = Arc::new(FakeUserDirectory::default());
    let service = service(directory.clone());
    let claims = IdentityClaims::from_pairs([("email", "a@example.com")]);

    let resolution = service.resolve("/api/users", Some(&claims)).await;

    assert!(matches!(resolution, Err(AppError::TenantClaimMissing(_))));
    assert!(directory.lookups.lock().await.is_empty());
}

#[tokio::test]
async fn unauthenticated_request_is_rejected_and_context_stays_empty() {
    let service = service(Arc::new(FakeUserDirectory::default()));
    let context = TenantContext::new();

    let resolution = service.resolve_into("/api/todos", None, &context).await;

    assert!(matches!(
        resolution,
        Err(AppError::AuthenticationRequired(_))
    ));
    assert!(!context.is_set());
}

#[tokio::test]
async fn bypassed_path_never_consults_claims_or_directory() {
    let directory = Arc::new(FakeUserDirectory::with_user("sub-123", "tenant-bbb"));
    let service = service(directory.clone());
    let context = TenantContext::new();
    let claims = IdentityClaims::from_pairs([("sub", "sub-123")]);

    let resolution = service
        .resolve_into("/HEALTH/ready", Some(&claims), &context)
        .await;

    assert_eq!(
        resolution.unwrap_or_else(|_| unreachable!()),
        TenantResolution::Bypassed
    );
    assert!(!context.is_set());
    assert!(directory.lookups.lock().await.is_empty());
}

#[tokio::test]
async fn resolve_into_binds_the_context() {
    let service = service(Arc::new(FakeUserDirectory::default()));
    let context = TenantContext::new();
    let claims = IdentityClaims::from_pairs([("tenant_id", "tenant-aaa")]);

    let resolution = service
        .resolve_into("/api/todos", Some(&claims), &context)
        .await;

    assert!(resolution.is_ok());
    assert_eq!(
        context.tenant_id().map(TenantId::as_str),
        Some("tenant-aaa")
    );
}

#[tokio::test]
async fn resolving_twice_yields_the_same_tenant() {
    let service = service(Arc::new(FakeUserDirectory::with_user(
        "sub-123",
        "tenant-bbb",
    )));
    let context = TenantContext::new();
    let claims = IdentityClaims::from_pairs([("sub", "sub-123")]);

    let first = service
        .resolve_into("/api/users", Some(&claims), &context)
        .await;
    let second = service
        .resolve_into("/api/users", Some(&claims), &context)
        .await;

    assert!(first.is_ok());
    assert_eq!(
        first.unwrap_or_else(|_| unreachable!()),
        second.unwrap_or_else(|_| unreachable!())
    );
}

#[tokio::test]
async fn custom_claim_names_are_honoured() {
    let settings = TenantResolutionSettings::new("org", "organization");
    let service = TenantResolutionService::new(settings, Arc::new(FakeUserDirectory::default()));
    let claims = IdentityClaims::from_pairs([("tenant_id", "ignored"), ("organization", "org-1")]);

    let resolution = service.resolve("/api/todos", Some(&claims)).await;

    assert_eq!(
        resolution.unwrap_or_else(|_| unreachable!()),
        resolved("org-1")
    );
}

#[test]
fn static_assets_are_exempt_only_outside_api() {
    let settings = TenantResolutionSettings::default();

    assert!(settings.is_bypassed("/assets/app.JS"));
    assert!(settings.is_bypassed("/fonts/inter.woff2"));
    assert!(!settings.is_bypassed("/api/reports/export.css"));
    assert!(!settings.is_bypassed("/API/logo.png"));
    assert!(settings.is_bypassed("/apidocs/logo.png"));
    assert!(!settings.is_bypassed("/assets/.css"));
}

#[test]
fn bypass_prefixes_stop_at_segment_boundaries() {
    let settings = TenantResolutionSettings::default();

    assert!(!settings.is_bypassed("/api/testimonials"));
    assert!(!settings.is_bypassed("/api/systems/tenants"));
    assert!(!settings.is_bypassed("/healthcare/records"));
    assert!(!settings.is_bypassed("/api/webhooksecrets"));
    assert!(settings.is_bypassed("/health"));
    assert!(settings.is_bypassed("/health/rls"));
    assert!(settings.is_bypassed("/api/webhooks/stripe"));
    assert!(settings.is_bypassed("/swagger/index.html"));
    assert!(settings.is_bypassed("/swagger.json"));
    assert!(settings.is_bypassed("/favicon.ico"));
}

#[tokio::test]
async fn similar_prefixed_route_still_requires_identity() {
    let service = service(Arc::new(FakeUserDirectory::default()));

    let resolution = service.resolve("/api/testimonials", None).await;

    assert!(matches!(
        resolution,
        Err(AppError::AuthenticationRequired(_))
    ));
}

#[tokio::test]
async fn operator_path_accepts_claims_without_tenant() {
    let directory = Arc::new(FakeUserDirectory::default());
    let service = service(directory.clone());
    let claims = IdentityClaims::from_pairs([("sub", "operator-1")]);

    let resolution = service
        .resolve("/api/admin/tenants/tenant-ccc/users", Some(&claims))
        .await;

    assert_eq!(
        resolution.unwrap_or_else(|_| unreachable!()),
        TenantResolution::Unscoped
    );
    assert_eq!(directory.lookups.lock().await.as_slice(), ["operator-1"]);
}

#[tokio::test]
async fn operator_path_keeps_a_resolvable_tenant() {
    let service = service(Arc::new(FakeUserDirectory::default()));
    let claims = IdentityClaims::from_pairs([("sub", "operator-1"), ("tenant_id", "tenant-ops")]);
    let context = TenantContext::new();

    let resolution = service
        .resolve_into("/api/admin/audit-events", Some(&claims), &context)
        .await;

    assert_eq!(
        resolution.unwrap_or_else(|_| unreachable!()),
        resolved("tenant-ops")
    );
    assert!(context.is_set());
}

#[tokio::test]
async fn operator_path_still_requires_identity() {
    let service = service(Arc::new(FakeUserDirectory::default()));
    let context = TenantContext::new();

    let resolution = service
        .resolve_into("/api/admin/audit-events", None, &context)
        .await;

    assert!(matches!(
        resolution,
        Err(AppError::AuthenticationRequired(_))
    ));
    assert!(!context.is_set());
}

#[test]
fn operator_prefixes_do_not_widen_to_similar_routes() {
    let settings = TenantResolutionSettings::default().with_operator_prefixes(["/api/ops", " "]);

    assert!(settings.is_operator_path("/api/admin/audit-events"));
    assert!(settings.is_operator_path("/API/Admin"));
    assert!(settings.is_operator_path("/api/ops/jobs"));
    assert!(!settings.is_operator_path("/api/administrators"));
    assert!(!settings.is_operator_path("/api/todos"));
    assert!(!settings.operator_prefixes().iter().any(String::is_empty));
}

#[test]
fn extra_bypass_prefixes_are_added() {
    let settings = TenantResolutionSettings::default().with_bypass_prefixes(["/metrics", "  "]);

    assert!(settings.is_bypassed("/metrics/prometheus"));
    assert!(!settings.is_bypassed("/api/todos"));
    assert!(!settings.bypass_prefixes().iter().any(String::is_empty));
}

proptest! {
    #[test]
    fn default_prefixes_match_any_case_and_suffix(
        prefix_index in 0_usize..10,
        upper in proptest::collection::vec(any::<bool>(), 32),
        suffix in "(/[a-z0-9]{0,8}){0,2}",
    ) {
        let settings = TenantResolutionSettings::default();
        let prefix = settings.bypass_prefixes()[prefix_index].clone();
        let cased: String = prefix
            .chars()
            .zip(upper.iter().cycle())
            .map(|(character, upper)| {
                if *upper {
                    character.to_ascii_uppercase()
                } else {
                    character
                }
            })
            .collect();

        let path = format!("{cased}{suffix}");
        prop_assert!(settings.is_bypassed(&path));
    }

    #[test]
    fn tenant_api_paths_are_never_bypassed(segment in "[a-z]{1,12}") {
        prop_assume!(!["webhooks", "system", "test"].contains(&segment.as_str()));
        let settings = TenantResolutionSettings::default();

        let path = format!("/api/{segment}");
        prop_assert!(!settings.is_bypassed(&path));
    }
}
