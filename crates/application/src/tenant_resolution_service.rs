mod settings;

use std::sync::Arc;

use palisade_core::{AppError, AppResult, IdentityClaims, TenantContext, TenantId};
use tracing::{debug, warn};

use crate::UserDirectory;

pub use settings::{
    DEFAULT_ALTERNATE_TENANT_CLAIM, DEFAULT_TENANT_CLAIM, TenantResolutionSettings,
};

/// Outcome of resolving the acting tenant for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantResolution {
    /// Path is exempt from tenant resolution.
    Bypassed,
    /// Request acts on behalf of this tenant.
    Resolved(TenantId),
    /// Authenticated operator path where the caller has no tenant of its own.
    Unscoped,
}

/// Application service deriving the acting tenant from verified claims.
#[derive(Clone)]
pub struct TenantResolutionService {
    settings: Arc<TenantResolutionSettings>,
    user_directory: Arc<dyn UserDirectory>,
}

impl TenantResolutionService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(settings: TenantResolutionSettings, user_directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            settings: Arc::new(settings),
            user_directory,
        }
    }

    /// Returns the active settings.
    #[must_use]
    pub fn settings(&self) -> &TenantResolutionSettings {
        &self.settings
    }

    /// Resolves the acting tenant for a request path and optional claims.
    ///
    /// Claims are never consulted for bypassed paths. Resolution order is the
    /// primary tenant claim, the alternate claim, then a directory lookup by
    /// subject. Operator paths still require claims but accept a caller with
    /// no resolvable tenant.
    pub async fn resolve(
        &self,
        path: &str,
        claims: Option<&IdentityClaims>,
    ) -> AppResult<TenantResolution> {
        if self.settings.is_bypassed(path) {
            debug!(path, "tenant resolution bypassed");
            return Ok(TenantResolution::Bypassed);
        }

        let Some(claims) = claims else {
            return Err(AppError::AuthenticationRequired(
                "authentication is required to access tenant resources".to_owned(),
            ));
        };

        if let Some(tenant_id) = self.tenant_from_claims(claims) {
            return Ok(TenantResolution::Resolved(tenant_id));
        }

        if let Some(tenant_id) = self.tenant_from_directory(claims).await {
            return Ok(TenantResolution::Resolved(tenant_id));
        }

        if self.settings.is_operator_path(path) {
            debug!(
                subject = claims.subject().unwrap_or("<none>"),
                path, "operator request proceeds without a tenant"
            );
            return Ok(TenantResolution::Unscoped);
        }

        warn!(
            subject = claims.subject().unwrap_or("<none>"),
            path, "authenticated request carries no resolvable tenant"
        );
        Err(AppError::TenantClaimMissing(
            "no tenant could be resolved for the authenticated user".to_owned(),
        ))
    }

    /// Resolves the acting tenant and binds it into `context`.
    pub async fn resolve_into(
        &self,
        path: &str,
        claims: Option<&IdentityClaims>,
        context: &TenantContext,
    ) -> AppResult<TenantResolution> {
        let resolution = self.resolve(path, claims).await?;
        if let TenantResolution::Resolved(tenant_id) = &resolution {
            context.set_tenant(tenant_id.clone())?;
        }

        Ok(resolution)
    }

    fn tenant_from_claims(&self, claims: &IdentityClaims) -> Option<TenantId> {
        claims
            .find_claim(self.settings.tenant_claim())
            .or_else(|| claims.find_claim(self.settings.alternate_tenant_claim()))
            .and_then(|value| TenantId::new(value).ok())
    }

    async fn tenant_from_directory(&self, claims: &IdentityClaims) -> Option<TenantId> {
        let subject = claims.subject()?;

        match self.user_directory.lookup_tenant_by_subject(subject).await {
            Ok(Some(lookup)) => {
                debug!(
                    subject,
                    user_id = %lookup.user_id,
                    tenant_id = %lookup.tenant_id,
                    "tenant resolved from user directory"
                );
                Some(lookup.tenant_id)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(subject, %error, "user directory lookup failed during tenant resolution");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
