//! Propagation of the request tenant into PostgreSQL session state.
//!
//! Row-level security policies read `app.current_tenant_id`. The connection
//! binder sets it when a pooled connection is handed to a request and the
//! command binder re-asserts it before every statement, so a connection that
//! previously served another tenant can never leak that tenant's value.

use async_trait::async_trait;
use palisade_core::{AppError, AppResult, TenantContext, TenantId};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Acquire, PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, error, warn};

const SET_CURRENT_TENANT_SQL: &str = "SELECT set_config('app.current_tenant_id', $1, false)";

const RESET_SESSION_SQL: &str =
    "SELECT set_config('app.current_tenant_id', '', false), set_config('app.is_admin', '', false)";

/// Connection-like target that can receive the tenant session variable.
#[async_trait]
pub trait TenantSessionSink: Send {
    /// Assigns `app.current_tenant_id` on this session.
    async fn set_current_tenant(&mut self, tenant_id: &TenantId) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl TenantSessionSink for PgConnection {
    async fn set_current_tenant(&mut self, tenant_id: &TenantId) -> Result<(), sqlx::Error> {
        sqlx::query(SET_CURRENT_TENANT_SQL)
            .bind(tenant_id.as_str())
            .execute(self)
            .await?;

        Ok(())
    }
}

/// Sets the tenant variable when a connection is opened for a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionSessionBinder;

impl ConnectionSessionBinder {
    /// Binds the context tenant to a freshly acquired connection.
    pub async fn on_connection_opened<S>(context: &TenantContext, session: &mut S)
    where
        S: TenantSessionSink + ?Sized,
    {
        bind_tenant(context, session, "connection_opened").await;
    }
}

/// Re-asserts the tenant variable before each command.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandSessionBinder;

impl CommandSessionBinder {
    /// Binds the context tenant immediately before a command is issued.
    pub async fn before_command<S>(context: &TenantContext, session: &mut S)
    where
        S: TenantSessionSink + ?Sized,
    {
        bind_tenant(context, session, "before_command").await;
    }
}

/// Failures are logged and swallowed; the triggering statement still runs.
async fn bind_tenant<S>(context: &TenantContext, session: &mut S, trigger: &'static str)
where
    S: TenantSessionSink + ?Sized,
{
    let Some(tenant_id) = context.tenant_id() else {
        debug!(trigger, "no tenant in context, session variable left unset");
        return;
    };

    if let Err(bind_error) = session.set_current_tenant(tenant_id).await {
        error!(
            trigger,
            tenant_id = %tenant_id,
            error = %bind_error,
            "failed to set app.current_tenant_id on database session"
        );
    }
}

/// Installs hooks clearing tenant session variables on every new physical
/// connection and every release back to the pool.
#[must_use]
pub fn with_session_reset_hooks(options: PgPoolOptions) -> PgPoolOptions {
    options
        .after_connect(|connection, _metadata| {
            Box::pin(async move {
                sqlx::query(RESET_SESSION_SQL).execute(connection).await?;
                Ok(())
            })
        })
        .after_release(|connection, _metadata| {
            Box::pin(async move {
                match sqlx::query(RESET_SESSION_SQL).execute(connection).await {
                    Ok(_) => Ok(true),
                    Err(reset_error) => {
                        warn!(error = %reset_error, "closing connection that failed session reset");
                        Ok(false)
                    }
                }
            })
        })
}

/// Pool wrapper that hands out connections bound to a tenant context.
#[derive(Clone)]
pub struct TenantBoundPool {
    pool: PgPool,
}

impl TenantBoundPool {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Acquires a connection and binds it to the context tenant.
    pub async fn acquire(&self, context: &TenantContext) -> AppResult<TenantConnection> {
        let mut connection = self.pool.acquire().await.map_err(|error| {
            AppError::Internal(format!("failed to acquire database connection: {error}"))
        })?;

        ConnectionSessionBinder::on_connection_opened(context, &mut *connection).await;

        Ok(TenantConnection {
            connection,
            context: context.clone(),
        })
    }
}

/// Pooled connection tied to one tenant context.
pub struct TenantConnection {
    connection: PoolConnection<Postgres>,
    context: TenantContext,
}

impl TenantConnection {
    /// Re-asserts the tenant and returns the connection for one command.
    pub async fn command(&mut self) -> &mut PgConnection {
        CommandSessionBinder::before_command(&self.context, &mut *self.connection).await;
        &mut self.connection
    }

    /// Starts a transaction on the bound connection.
    pub async fn begin(&mut self) -> AppResult<TenantTransaction<'_>> {
        let context = self.context.clone();
        let transaction = self.connection.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        Ok(TenantTransaction {
            transaction,
            context,
        })
    }
}

/// Transaction whose commands are each preceded by the tenant binder.
pub struct TenantTransaction<'c> {
    transaction: Transaction<'c, Postgres>,
    context: TenantContext,
}

impl TenantTransaction<'_> {
    /// Re-asserts the tenant and returns the transaction connection for one command.
    pub async fn command(&mut self) -> &mut PgConnection {
        CommandSessionBinder::before_command(&self.context, &mut *self.transaction).await;
        &mut self.transaction
    }

    /// Commits every command issued in this transaction.
    pub async fn commit(self) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}
