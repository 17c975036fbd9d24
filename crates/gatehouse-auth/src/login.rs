//! Login flow.
//!
//! [`LoginService`] orchestrates the credential store, token issuer, and
//! session cache: look up the user, check lockout, verify the password,
//! update the failure counter, issue a token, and cache it under the
//! username.
//!
//! Unknown-username and wrong-password failures share one public error so
//! responses never reveal whether an account exists. Only the
//! wrong-password branch touches a failure counter; an absent user has none
//! to increment.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use gatehouse_cache::{SessionCache, StringCodec};

use crate::AuthResult;
use crate::error::AuthError;
use crate::store::credentials::CredentialStore;
use crate::store::roles::RoleStore;
use crate::token::issuer::TokenIssuer;

/// Cache of serialized tokens keyed by username.
pub type TokenCache = SessionCache<String, StringCodec>;

/// Authenticates users and issues bearer tokens.
///
/// Stateless per request; all collaborators are shared behind `Arc`s and
/// injected at construction.
pub struct LoginService {
    credentials: Arc<dyn CredentialStore>,
    roles: Arc<dyn RoleStore>,
    issuer: Arc<TokenIssuer>,
    sessions: Arc<TokenCache>,
}

impl LoginService {
    /// Creates a login service over its collaborators.
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        roles: Arc<dyn RoleStore>,
        issuer: Arc<TokenIssuer>,
        sessions: Arc<TokenCache>,
    ) -> Self {
        Self {
            credentials,
            roles,
            issuer,
            sessions,
        }
    }

    /// Authenticate `username` with `password` and return a signed token.
    ///
    /// On success the failure counter is reset and the token is written to
    /// the session cache under the username. The cache write is
    /// fire-and-forget: the token is returned without waiting for it, and a
    /// failed write is logged, never surfaced.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] for an unknown username or wrong
    ///   password
    /// - [`AuthError::AccountLocked`] while a lockout is active
    /// - [`AuthError::Storage`] if a store call fails
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<String> {
        let Some(user) = self.credentials.find_by_username(username).await? else {
            debug!(username = %username, "login attempt for unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let now = OffsetDateTime::now_utc();
        if user.is_locked_out(now) {
            let locked_until = user.locked_until.unwrap_or(now);
            warn!(
                username = %user.username,
                locked_until = %locked_until,
                "login attempt against locked account"
            );
            return Err(AuthError::account_locked(locked_until));
        }

        if !user.active {
            debug!(username = %user.username, "login attempt for inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        if self.credentials.verify_password(user.id, password).await? {
            self.credentials.reset_failures(user.id).await?;

            let roles = self.roles.role_names(user.id).await?;
            let token = self
                .issuer
                .issue_for(&user.username, roles)
                .map_err(|e| AuthError::internal(e.to_string()))?;

            self.cache_token(&user.username, &token);

            info!(username = %user.username, "login succeeded");
            Ok(token)
        } else {
            let outcome = self.credentials.record_failure(user.id).await?;
            warn!(
                username = %user.username,
                failed_count = outcome.failed_count,
                lockout_triggered = outcome.lockout_triggered(),
                "login failed: wrong password"
            );
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Spawn the session-cache write; the login response never waits on it.
    fn cache_token(&self, username: &str, token: &str) {
        let sessions = Arc::clone(&self.sessions);
        let username = username.to_string();
        let token = token.to_string();
        tokio::spawn(async move {
            if let Err(e) = sessions.set(&username, &token).await {
                warn!(username = %username, error = %e, "session cache write failed");
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
