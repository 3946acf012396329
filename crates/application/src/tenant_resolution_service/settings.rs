/// Default primary tenant claim name.
pub const DEFAULT_TENANT_CLAIM: &str = "tenant_id";
/// Default alternate tenant claim name.
pub const DEFAULT_ALTERNATE_TENANT_CLAIM: &str = "tid";

const DEFAULT_BYPASS_PREFIXES: &[&str] = &[
    "/health",
    "/alive",
    "/swagger",
    "/openapi",
    "/api/webhooks",
    "/api/system",
    "/api/test",
    "/_framework",
    "/_content",
    "/favicon.ico",
];

const STATIC_FILE_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "ttf", "map",
];

const DEFAULT_OPERATOR_PREFIXES: &[&str] = &["/api/admin"];

const API_NAMESPACE: &str = "/api";

/// Claim names and bypass rules used by tenant resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantResolutionSettings {
    tenant_claim: String,
    alternate_tenant_claim: String,
    bypass_prefixes: Vec<String>,
    operator_prefixes: Vec<String>,
}

impl TenantResolutionSettings {
    /// Creates settings with custom claim names and the default bypass list.
    #[must_use]
    pub fn new(tenant_claim: impl Into<String>, alternate_tenant_claim: impl Into<String>) -> Self {
        Self {
            tenant_claim: tenant_claim.into(),
            alternate_tenant_claim: alternate_tenant_claim.into(),
            bypass_prefixes: DEFAULT_BYPASS_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_owned())
                .collect(),
            operator_prefixes: DEFAULT_OPERATOR_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_owned())
                .collect(),
        }
    }

    /// Adds extra bypass prefixes. Blank entries are ignored.
    #[must_use]
    pub fn with_bypass_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bypass_prefixes.extend(
            prefixes
                .into_iter()
                .map(Into::into)
                .map(|prefix| prefix.trim().to_owned())
                .filter(|prefix| !prefix.is_empty()),
        );
        self
    }

    /// Adds extra operator prefixes. Blank entries are ignored.
    ///
    /// Operator paths require identity but accept callers with no tenant.
    #[must_use]
    pub fn with_operator_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operator_prefixes.extend(
            prefixes
                .into_iter()
                .map(Into::into)
                .map(|prefix| prefix.trim().to_owned())
                .filter(|prefix| !prefix.is_empty()),
        );
        self
    }

    /// Returns the primary tenant claim name.
    #[must_use]
    pub fn tenant_claim(&self) -> &str {
        self.tenant_claim.as_str()
    }

    /// Returns the alternate tenant claim name.
    #[must_use]
    pub fn alternate_tenant_claim(&self) -> &str {
        self.alternate_tenant_claim.as_str()
    }

    /// Returns the configured bypass prefixes.
    #[must_use]
    pub fn bypass_prefixes(&self) -> &[String] {
        &self.bypass_prefixes
    }

    /// Returns the configured operator prefixes.
    #[must_use]
    pub fn operator_prefixes(&self) -> &[String] {
        &self.operator_prefixes
    }

    /// Returns whether `path` skips tenant resolution.
    ///
    /// Prefixes match ASCII case-insensitively on whole path segments, so
    /// `/health` covers `/health/rls` but not `/healthcare`. Static asset
    /// extensions only exempt paths outside the `/api` namespace.
    #[must_use]
    pub fn is_bypassed(&self, path: &str) -> bool {
        if self
            .bypass_prefixes
            .iter()
            .any(|prefix| starts_with_segments(path, prefix))
        {
            return true;
        }

        !is_api_path(path) && has_static_file_extension(path)
    }

    /// Returns whether `path` is an operator path: identity is required but a
    /// tenant is optional.
    #[must_use]
    pub fn is_operator_path(&self, path: &str) -> bool {
        self.operator_prefixes
            .iter()
            .any(|prefix| starts_with_segments(path, prefix))
    }
}

impl Default for TenantResolutionSettings {
    fn default() -> Self {
        Self::new(DEFAULT_TENANT_CLAIM, DEFAULT_ALTERNATE_TENANT_CLAIM)
    }
}

fn starts_with_ignore_ascii_case(path: &str, prefix: &str) -> bool {
    path.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// Prefix match that stops at a segment boundary. A `.` boundary keeps
/// documents such as `/swagger.json` under `/swagger`.
fn starts_with_segments(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if !starts_with_ignore_ascii_case(path, prefix) {
        return false;
    }

    matches!(path.as_bytes().get(prefix.len()), None | Some(b'/' | b'.'))
}

fn is_api_path(path: &str) -> bool {
    if !starts_with_ignore_ascii_case(path, API_NAMESPACE) {
        return false;
    }

    matches!(path.as_bytes().get(API_NAMESPACE.len()), None | Some(b'/'))
}

fn has_static_file_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    let Some((stem, extension)) = last_segment.rsplit_once('.') else {
        return false;
    };

    !stem.is_empty()
        && STATIC_FILE_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
}
