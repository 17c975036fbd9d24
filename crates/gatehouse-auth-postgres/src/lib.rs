//! PostgreSQL storage backend for Gatehouse auth.
//!
//! Provides persistent implementations of the core store traits:
//!
//! - [`PgCredentialStore`]: users, password verification, failure
//!   counting with atomic lockout
//! - [`PgRoleStore`]: roles and role membership
//!
//! The failure counter update is a single conditional `UPDATE` so
//! concurrent failed logins against one account never lose an increment or
//! race the threshold check.
//!
//! The schema lives in `migrations/`; apply it with `sqlx migrate run` or
//! any SQL runner before first use.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_auth_postgres::{PgCredentialStore, PgRoleStore, connect};
//!
//! let pool = connect("postgres://localhost/gatehouse", 5).await?;
//! let credentials = PgCredentialStore::new(pool.clone(), policy, lockout);
//! let roles = PgRoleStore::new(pool);
//! ```

pub mod credentials;
pub mod roles;

use gatehouse_auth::{AuthError, AuthResult};
use sqlx_core::pool::Pool;
use sqlx_postgres::{PgPoolOptions, Postgres};

pub use credentials::PgCredentialStore;
pub use roles::PgRoleStore;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

/// Connects a pool to the given database URL.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(url: &str, max_connections: u32) -> AuthResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| AuthError::storage(format!("failed to connect to postgres: {e}")))?;
    tracing::debug!(max_connections, "postgres connection pool ready");
    Ok(pool)
}

/// Maps a database error into the crate-level storage error, tagging the
/// failing operation.
pub(crate) fn db_err(operation: &str, err: sqlx_core::Error) -> AuthError {
    AuthError::storage(format!("{operation}: {err}"))
}

/// Returns `true` if the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx_core::Error) -> bool {
    matches!(err, sqlx_core::Error::Database(db) if db.is_unique_violation())
}
