//! Credential store over PostgreSQL.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use gatehouse_auth::config::{LockoutPolicy, PasswordPolicy};
use gatehouse_auth::store::credentials::{CredentialStore, FailureOutcome, NewUser, User};
use gatehouse_auth::store::password::{hash_password, verify_password};
use gatehouse_auth::{AuthError, AuthResult};

use crate::{PgPool, db_err, is_unique_violation};

type UserTuple = (
    Uuid,
    String,
    Option<String>,
    i32,
    Option<OffsetDateTime>,
    bool,
    OffsetDateTime,
    OffsetDateTime,
);

fn user_from_row(row: UserTuple) -> User {
    User {
        id: row.0,
        username: row.1,
        email: row.2,
        failed_count: row.3.max(0) as u32,
        locked_until: row.4,
        active: row.5,
        created_at: row.6,
        updated_at: row.7,
    }
}

/// Decides the login outcome reported for a just-recorded failure.
///
/// The stored `locked_until` only belongs in the outcome when this failure
/// reached the threshold; below it, any value in the column is a leftover
/// from an earlier, elapsed lockout.
fn outcome_from_row(
    failed_count: i32,
    locked_until: Option<OffsetDateTime>,
    max_failures: u32,
) -> FailureOutcome {
    let failed_count = failed_count.max(0) as u32;
    FailureOutcome {
        failed_count,
        locked_until: (failed_count >= max_failures)
            .then_some(locked_until)
            .flatten(),
    }
}

/// PostgreSQL implementation of [`CredentialStore`].
pub struct PgCredentialStore {
    pool: PgPool,
    password_policy: PasswordPolicy,
    lockout: LockoutPolicy,
}

impl PgCredentialStore {
    /// Creates a credential store over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool, password_policy: PasswordPolicy, lockout: LockoutPolicy) -> Self {
        Self {
            pool,
            password_policy,
            lockout,
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, username, email, failed_count, locked_until, active,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find user by username", e))?;

        Ok(row.map(user_from_row))
    }

    async fn create(&self, new_user: NewUser) -> AuthResult<User> {
        self.password_policy
            .check(&new_user.password)
            .map_err(AuthError::password_policy)?;
        let password_hash = hash_password(&new_user.password)?;

        let user = {
            let mut user = User::new(new_user.username);
            user.email = new_user.email;
            user
        };

        let result = query(
            r#"
            INSERT INTO users (id, username, email, password_hash, failed_count,
                               locked_until, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, NULL, TRUE, $5, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AuthError::storage(format!(
                "username '{}' already exists",
                user.username
            ))),
            Err(e) => Err(db_err("create user", e)),
        }
    }

    async fn verify_password(&self, user_id: Uuid, password: &str) -> AuthResult<bool> {
        let row: Option<(String,)> = query_as("SELECT password_hash FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("load password hash", e))?;

        let (hash,) = row.ok_or_else(|| AuthError::storage(format!("user {user_id} not found")))?;
        verify_password(&hash, password)
    }

    async fn record_failure(&self, user_id: Uuid) -> AuthResult<FailureOutcome> {
        let lock_at = OffsetDateTime::now_utc() + self.lockout.duration;

        // One conditional UPDATE: the increment and the threshold check see
        // the same row version, so concurrent failures cannot lose updates.
        let row: Option<(i32, Option<OffsetDateTime>)> = query_as(
            r#"
            UPDATE users
            SET failed_count = failed_count + 1,
                locked_until = CASE
                    WHEN failed_count + 1 >= $2 THEN $3
                    ELSE locked_until
                END,
                updated_at = now()
            WHERE id = $1
            RETURNING failed_count, locked_until
            "#,
        )
        .bind(user_id)
        .bind(self.lockout.max_failures as i32)
        .bind(lock_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("record login failure", e))?;

        let (failed_count, locked_until) =
            row.ok_or_else(|| AuthError::storage(format!("user {user_id} not found")))?;

        Ok(outcome_from_row(
            failed_count,
            locked_until,
            self.lockout.max_failures,
        ))
    }

    async fn reset_failures(&self, user_id: Uuid) -> AuthResult<()> {
        let result = query(
            r#"
            UPDATE users
            SET failed_count = 0, locked_until = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("reset login failures", e))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::storage(format!("user {user_id} not found")));
        }
        Ok(())
    }
}
