use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use sqlx::PgPool;
use tracing::{error, info, warn};

/// Tables that must be protected by tenant row-level security.
pub const REQUIRED_RLS_TABLES: &[&str] = &["users", "todos"];

const REQUIRED_FUNCTIONS: &[&str] = &["set_current_tenant", "get_current_tenant"];
const ISOLATION_POLICY: &str = "tenant_isolation_policy";
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a row-level security verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlsHealth {
    /// Every required table is protected.
    Healthy(String),
    /// Protection cannot be confirmed yet.
    Degraded(String),
    /// Tenant data is not protected.
    Unhealthy(String),
}

impl RlsHealth {
    /// Returns whether the check passed.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy(_))
    }

    /// Returns a stable status label.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Healthy(_) => "healthy",
            Self::Degraded(_) => "degraded",
            Self::Unhealthy(_) => "unhealthy",
        }
    }

    /// Returns the human-readable detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Healthy(detail) | Self::Degraded(detail) | Self::Unhealthy(detail) => detail,
        }
    }
}

/// Catalog facts gathered from PostgreSQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RlsCatalog {
    functions: BTreeSet<String>,
    row_security_by_table: BTreeMap<String, bool>,
    tables_with_policy: BTreeSet<String>,
}

/// Verifies that tenant row-level security is installed and enabled.
#[derive(Clone)]
pub struct RowLevelSecurityHealthCheck {
    pool: PgPool,
}

impl RowLevelSecurityHealthCheck {
    /// Creates a health check over the provided pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the check. Never fails; problems are reported in the outcome.
    pub async fn check(&self) -> RlsHealth {
        let health = match tokio::time::timeout(CHECK_TIMEOUT, self.load_catalog()).await {
            Ok(Ok(catalog)) => evaluate(&catalog, REQUIRED_RLS_TABLES),
            Ok(Err(query_error)) => RlsHealth::Unhealthy(format!(
                "database error verifying row-level security: {query_error}"
            )),
            Err(_) => RlsHealth::Degraded(format!(
                "timed out after {}s verifying row-level security",
                CHECK_TIMEOUT.as_secs()
            )),
        };

        match &health {
            RlsHealth::Healthy(detail) => info!(detail = detail.as_str(), "rls health check passed"),
            RlsHealth::Degraded(detail) => warn!(detail = detail.as_str(), "rls health check degraded"),
            RlsHealth::Unhealthy(detail) => error!(detail = detail.as_str(), "rls health check failed"),
        }

        health
    }

    async fn load_catalog(&self) -> Result<RlsCatalog, sqlx::Error> {
        let functions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT proname::TEXT
            FROM pg_proc
            WHERE proname = ANY($1)
            "#,
        )
        .bind(REQUIRED_FUNCTIONS)
        .fetch_all(&self.pool)
        .await?;

        let row_security = sqlx::query_as::<_, (String, bool)>(
            r#"
            SELECT tablename::TEXT, rowsecurity
            FROM pg_tables
            WHERE schemaname = 'public'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let tables_with_policy = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT tablename::TEXT
            FROM pg_policies
            WHERE schemaname = 'public' AND policyname = $1
            "#,
        )
        .bind(ISOLATION_POLICY)
        .fetch_all(&self.pool)
        .await?;

        Ok(RlsCatalog {
            functions: functions.into_iter().collect(),
            row_security_by_table: row_security.into_iter().collect(),
            tables_with_policy: tables_with_policy.into_iter().collect(),
        })
    }
}

fn evaluate(catalog: &RlsCatalog, required_tables: &[&str]) -> RlsHealth {
    let missing_functions: Vec<&str> = REQUIRED_FUNCTIONS
        .iter()
        .copied()
        .filter(|function| !catalog.functions.contains(*function))
        .collect();
    if !missing_functions.is_empty() {
        return RlsHealth::Unhealthy(format!(
            "row-level security functions missing: {}",
            missing_functions.join(", ")
        ));
    }

    let mut missing_tables = Vec::new();
    let mut disabled_tables = Vec::new();
    for table in required_tables {
        match catalog.row_security_by_table.get(*table) {
            None => missing_tables.push(*table),
            Some(false) => disabled_tables.push(*table),
            Some(true) => {}
        }
    }

    if !disabled_tables.is_empty() {
        return RlsHealth::Unhealthy(format!(
            "row-level security is not enabled on tables: {}",
            disabled_tables.join(", ")
        ));
    }

    let missing_policies: Vec<&str> = required_tables
        .iter()
        .copied()
        .filter(|table| catalog.row_security_by_table.contains_key(*table))
        .filter(|table| !catalog.tables_with_policy.contains(*table))
        .collect();
    if !missing_policies.is_empty() {
        return RlsHealth::Unhealthy(format!(
            "{ISOLATION_POLICY} missing on tables: {}",
            missing_policies.join(", ")
        ));
    }

    if !missing_tables.is_empty() {
        return RlsHealth::Degraded(format!(
            "tables not created yet: {}",
            missing_tables.join(", ")
        ));
    }

    RlsHealth::Healthy(format!(
        "row-level security enabled on {} tables: {}",
        required_tables.len(),
        required_tables.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::{REQUIRED_RLS_TABLES, RlsCatalog, RlsHealth, RowLevelSecurityHealthCheck, evaluate};
    use crate::test_support::test_pool;

    fn protected_catalog() -> RlsCatalog {
        RlsCatalog {
            functions: ["set_current_tenant", "get_current_tenant"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            row_security_by_table: [("users".to_owned(), true), ("todos".to_owned(), true)]
                .into_iter()
                .collect(),
            tables_with_policy: ["users", "todos"].into_iter().map(str::to_owned).collect(),
        }
    }

    #[test]
    fn fully_protected_catalog_is_healthy() {
        assert!(evaluate(&protected_catalog(), REQUIRED_RLS_TABLES).is_healthy());
    }

    #[test]
    fn missing_function_is_unhealthy() {
        let mut catalog = protected_catalog();
        catalog.functions.remove("get_current_tenant");

        let health = evaluate(&catalog, REQUIRED_RLS_TABLES);

        assert!(matches!(health, RlsHealth::Unhealthy(_)));
        assert!(health.detail().contains("get_current_tenant"));
    }

    #[test]
    fn disabled_row_security_is_unhealthy() {
        let mut catalog = protected_catalog();
        catalog.row_security_by_table.insert("todos".to_owned(), false);

        assert_eq!(
            evaluate(&catalog, REQUIRED_RLS_TABLES).status(),
            "unhealthy"
        );
    }

    #[test]
    fn missing_policy_is_unhealthy() {
        let mut catalog = protected_catalog();
        catalog.tables_with_policy.remove("users");

        let health = evaluate(&catalog, REQUIRED_RLS_TABLES);

        assert!(matches!(health, RlsHealth::Unhealthy(_)));
        assert!(health.detail().contains("users"));
    }

    #[test]
    fn tables_not_yet_created_are_degraded() {
        let mut catalog = protected_catalog();
        catalog.row_security_by_table.remove("todos");
        catalog.tables_with_policy.remove("todos");

        assert_eq!(evaluate(&catalog, REQUIRED_RLS_TABLES).status(), "degraded");
    }

    #[tokio::test]
    async fn migrated_database_is_healthy() {
        let Some(pool) = test_pool(2).await else {
            return;
        };

        let health = RowLevelSecurityHealthCheck::new(pool).check().await;

        assert!(health.is_healthy(), "unexpected rls health: {health:?}");
    }
}
