use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use palisade_application::{
    DEFAULT_ADMIN_ROLE, DEFAULT_ALTERNATE_TENANT_CLAIM, DEFAULT_TENANT_CLAIM,
    TenantResolutionSettings,
};
use palisade_core::AppError;
use tracing_subscriber::EnvFilter;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub tenant_claim: String,
    pub alternate_tenant_claim: String,
    pub extra_bypass_paths: Vec<String>,
    pub admin_role: String,
    pub rls_startup_check: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(10);

        let jwt_secret = required_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters"
            )));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let tenant_claim = optional_non_empty_env("TENANT_CLAIM_NAME")
            .unwrap_or_else(|| DEFAULT_TENANT_CLAIM.to_owned());
        let alternate_tenant_claim = optional_non_empty_env("TENANT_CLAIM_ALT_NAME")
            .unwrap_or_else(|| DEFAULT_ALTERNATE_TENANT_CLAIM.to_owned());
        let extra_bypass_paths = env::var("TENANT_BYPASS_PATHS")
            .map(|value| parse_path_list(value.as_str()))
            .unwrap_or_default();
        let admin_role = optional_non_empty_env("ADMIN_ROLE_NAME")
            .unwrap_or_else(|| DEFAULT_ADMIN_ROLE.to_owned());
        let rls_startup_check = env::var("RLS_STARTUP_CHECK")
            .map(|value| !value.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            jwt_secret,
            frontend_url,
            api_host,
            api_port,
            tenant_claim,
            alternate_tenant_claim,
            extra_bypass_paths,
            admin_role,
            rls_startup_check,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn tenant_resolution_settings(&self) -> TenantResolutionSettings {
        TenantResolutionSettings::new(
            self.tenant_claim.as_str(),
            self.alternate_tenant_claim.as_str(),
        )
        .with_bypass_prefixes(self.extra_bypass_paths.iter().cloned())
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_path_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::parse_path_list;

    #[test]
    fn bypass_path_list_skips_blank_entries() {
        assert_eq!(
            parse_path_list(" /metrics, ,/api/public ,"),
            vec!["/metrics".to_owned(), "/api/public".to_owned()]
        );
    }
}
