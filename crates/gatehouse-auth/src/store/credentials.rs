//! Credential store trait.
//!
//! Defines the interface for user persistence and password verification.
//! Implementations are provided by storage backends (e.g., PostgreSQL) and
//! own password hashing, failure counting, and lockout state; services only
//! consume the verdicts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;

// =============================================================================
// User Type
// =============================================================================

/// A user account as seen by the authentication services.
///
/// The password hash never leaves the credential store; this type only
/// carries the state services need for the login decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: Uuid,

    /// Username for authentication (unique, matched case-sensitively).
    pub username: String,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Consecutive failed login attempts since the last successful login.
    pub failed_count: u32,

    /// End of the current lockout, if one is active or has been active.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub locked_until: Option<OffsetDateTime>,

    /// Whether the account is active. Inactive users cannot authenticate.
    pub active: bool,

    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new active user with the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: None,
            failed_count: 0,
            locked_until: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user builder.
    #[must_use]
    pub fn builder(username: impl Into<String>) -> UserBuilder {
        UserBuilder::new(username)
    }

    /// Returns `true` if a lockout is active at `now`.
    #[must_use]
    pub fn is_locked_out(&self, now: OffsetDateTime) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// Builder for creating `User` instances.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    fn new(username: impl Into<String>) -> Self {
        Self {
            user: User::new(username),
        }
    }

    /// Sets the user ID.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.user.id = id;
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.user.email = Some(email.into());
        self
    }

    /// Sets the failed-attempt counter.
    #[must_use]
    pub fn failed_count(mut self, count: u32) -> Self {
        self.user.failed_count = count;
        self
    }

    /// Sets the lockout end.
    #[must_use]
    pub fn locked_until(mut self, until: OffsetDateTime) -> Self {
        self.user.locked_until = Some(until);
        self
    }

    /// Sets whether the user is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.user.active = active;
        self
    }

    /// Builds the user.
    #[must_use]
    pub fn build(self) -> User {
        self.user
    }
}

// =============================================================================
// Inputs and Outcomes
// =============================================================================

/// Input for creating a user account.
///
/// The password is plaintext here; the store hashes it after checking the
/// password policy.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username (must be unique).
    pub username: String,

    /// Email address.
    pub email: Option<String>,

    /// Plaintext password to hash and store.
    pub password: String,
}

impl NewUser {
    /// Creates a new-user input.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: Some(email.into()),
            password: password.into(),
        }
    }
}

/// Result of recording a failed login attempt.
///
/// Returned by the store's atomic count-and-check so callers never race a
/// separate read against the increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    /// The counter value after this failure.
    pub failed_count: u32,

    /// Set when this failure pushed the account over the threshold.
    pub locked_until: Option<OffsetDateTime>,
}

impl FailureOutcome {
    /// Returns `true` if this failure triggered a lockout.
    #[must_use]
    pub fn lockout_triggered(&self) -> bool {
        self.locked_until.is_some()
    }
}

// =============================================================================
// Credential Store Trait
// =============================================================================

/// Storage operations for user credentials.
///
/// The failure-counter increment and the lockout-threshold check must be
/// atomic inside [`CredentialStore::record_failure`]; concurrent failed
/// logins against one account must never lose an update.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by username (case-sensitive).
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Create a new user account.
    ///
    /// Enforces the password policy and hashes the password before storing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The password does not satisfy the policy
    /// - A user with the same username already exists
    /// - The storage operation fails
    async fn create(&self, new_user: NewUser) -> AuthResult<User>;

    /// Verify a user's password against the stored hash.
    ///
    /// Returns `Ok(false)` for a mismatch; recording the failure is the
    /// caller's decision via [`CredentialStore::record_failure`].
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the storage operation
    /// fails.
    async fn verify_password(&self, user_id: Uuid, password: &str) -> AuthResult<bool>;

    /// Atomically record a failed login attempt.
    ///
    /// Increments the failure counter and, when the new count reaches the
    /// configured threshold, sets the lockout end in the same operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the storage operation
    /// fails.
    async fn record_failure(&self, user_id: Uuid) -> AuthResult<FailureOutcome>;

    /// Reset the failure counter and clear any lockout.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the storage operation
    /// fails.
    async fn reset_failures(&self, user_id: Uuid) -> AuthResult<()>;
}
