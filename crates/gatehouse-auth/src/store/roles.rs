//! Role store trait.
//!
//! Defines the interface for role persistence and membership operations.
//! Implementations are provided by storage backends (e.g., PostgreSQL).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;

// =============================================================================
// Role Type
// =============================================================================

/// A role that can be assigned to users.
///
/// Role names appear verbatim as `role` claims in issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier for the role.
    pub id: Uuid,

    /// Role name (unique).
    pub name: String,

    /// When the role was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Role {
    /// Creates a new role with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

// =============================================================================
// Role Store Trait
// =============================================================================

/// Storage operations for roles and role membership.
///
/// A (user, role) pair appears at most once; [`RoleStore::assign`] is
/// idempotent at the store level.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Find a role by its name.
    ///
    /// Returns `None` if the role doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<Role>>;

    /// Create a new role.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A role with the same name already exists
    /// - The storage operation fails
    async fn create(&self, role: &Role) -> AuthResult<()>;

    /// Returns `true` if the user holds the role.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn is_member(&self, user_id: Uuid, role_id: Uuid) -> AuthResult<bool>;

    /// Assign the role to the user.
    ///
    /// Assigning an already-held role is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the user or role doesn't exist, or the storage
    /// operation fails.
    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AuthResult<()>;

    /// Names of the roles held by the user, in assignment order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn role_names(&self, user_id: Uuid) -> AuthResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_new() {
        let role = Role::new("subscriptor");
        assert_eq!(role.name, "subscriptor");
    }

    #[test]
    fn test_role_serialization_round_trip() {
        let role = Role::new("subscriptor");
        let json = serde_json::to_string(&role).unwrap();
        let decoded: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, role.id);
        assert_eq!(decoded.name, role.name);
    }
}
