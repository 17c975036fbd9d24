//! Registration flow.
//!
//! [`RegistrationService`] runs the three-step account bootstrap: ensure
//! the default role exists, create the user if absent, assign the role if
//! not yet held. Every step is check-then-act, so calling
//! [`RegistrationService::register`] twice with the same username leaves
//! exactly one role, one user, and one membership behind, and the second
//! call still succeeds. An existing user's email and password are left
//! untouched (create-or-confirm, not upsert).

use std::sync::Arc;

use tracing::{debug, info};

use crate::AuthResult;
use crate::error::AuthError;
use crate::store::credentials::{CredentialStore, NewUser, User};
use crate::store::roles::{Role, RoleStore};

/// Bootstraps user accounts idempotently.
pub struct RegistrationService {
    credentials: Arc<dyn CredentialStore>,
    roles: Arc<dyn RoleStore>,
    default_role: String,
}

impl RegistrationService {
    /// Creates a registration service granting `default_role` to new
    /// accounts.
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        roles: Arc<dyn RoleStore>,
        default_role: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            roles,
            default_role: default_role.into(),
        }
    }

    /// Register an account: default role, user, membership.
    ///
    /// # Errors
    ///
    /// - [`AuthError::RoleCreationFailed`] if the default role is missing
    ///   and cannot be created
    /// - [`AuthError::UserCreationFailed`] if the user is missing and cannot
    ///   be created (including password-policy rejections)
    /// - [`AuthError::RoleAssignmentFailed`] if the membership cannot be
    ///   recorded
    /// - [`AuthError::Storage`] if an existence check itself fails
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<()> {
        let role = self.ensure_default_role().await?;
        let user = self.ensure_user(username, email, password).await?;
        self.ensure_membership(&user, &role).await?;

        info!(username = %user.username, role = %role.name, "registration complete");
        Ok(())
    }

    async fn ensure_default_role(&self) -> AuthResult<Role> {
        if let Some(role) = self.roles.find_by_name(&self.default_role).await? {
            return Ok(role);
        }

        let role = Role::new(&self.default_role);
        self.roles
            .create(&role)
            .await
            .map_err(|e| AuthError::role_creation_failed(e.to_string()))?;
        debug!(role = %role.name, "default role created");
        Ok(role)
    }

    async fn ensure_user(&self, username: &str, email: &str, password: &str) -> AuthResult<User> {
        if let Some(user) = self.credentials.find_by_username(username).await? {
            debug!(username = %username, "user already exists; leaving email and password untouched");
            return Ok(user);
        }

        self.credentials
            .create(NewUser::new(username, email, password))
            .await
            .map_err(|e| AuthError::user_creation_failed(e.to_string()))
    }

    async fn ensure_membership(&self, user: &User, role: &Role) -> AuthResult<()> {
        if self.roles.is_member(user.id, role.id).await? {
            return Ok(());
        }

        self.roles
            .assign(user.id, role.id)
            .await
            .map_err(|e| AuthError::role_assignment_failed(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
