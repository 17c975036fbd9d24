//! In-memory credential and role store.
//!
//! A single [`MemoryAuthStore`] implements both [`CredentialStore`] and
//! [`RoleStore`] over one mutex-guarded state, which makes the failure
//! count-and-check atomic for free. Suitable for single-instance
//! development deployments and as the fixture for service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::config::{LockoutPolicy, PasswordPolicy};
use crate::error::AuthError;
use crate::store::credentials::{CredentialStore, FailureOutcome, NewUser, User};
use crate::store::password::{hash_password, verify_password};
use crate::store::roles::{Role, RoleStore};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, UserRecord>,
    usernames: HashMap<String, Uuid>,
    roles: HashMap<Uuid, Role>,
    role_names: HashMap<String, Uuid>,
    // Assignment order is preserved; role_names() reports it.
    memberships: Vec<(Uuid, Uuid)>,
}

struct UserRecord {
    user: User,
    password_hash: String,
}

/// In-memory implementation of the credential and role stores.
pub struct MemoryAuthStore {
    state: Mutex<State>,
    password_policy: PasswordPolicy,
    lockout: LockoutPolicy,
}

impl MemoryAuthStore {
    /// Creates an empty store with the given policies.
    #[must_use]
    pub fn new(password_policy: PasswordPolicy, lockout: LockoutPolicy) -> Self {
        Self {
            state: Mutex::new(State::default()),
            password_policy,
            lockout,
        }
    }

    /// Creates an empty store with default policies.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(PasswordPolicy::default(), LockoutPolicy::default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // Lock poisoning only happens if a holder panicked; propagate the
        // inner state anyway rather than wedging every later request.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Number of stored roles.
    #[must_use]
    pub fn role_count(&self) -> usize {
        self.lock().roles.len()
    }

    /// Number of stored (user, role) memberships.
    #[must_use]
    pub fn membership_count(&self) -> usize {
        self.lock().memberships.len()
    }

    /// Activate or deactivate an account by username.
    ///
    /// Development-store affordance; persistent backends manage this through
    /// their own administration paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is unknown.
    pub fn set_active(&self, username: &str, active: bool) -> AuthResult<()> {
        let mut state = self.lock();
        let id = state
            .usernames
            .get(username)
            .copied()
            .ok_or_else(|| AuthError::storage(format!("user '{username}' not found")))?;
        if let Some(record) = state.users.get_mut(&id) {
            record.user.active = active;
            record.user.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryAuthStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let state = self.lock();
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .map(|record| record.user.clone()))
    }

    async fn create(&self, new_user: NewUser) -> AuthResult<User> {
        self.password_policy
            .check(&new_user.password)
            .map_err(AuthError::password_policy)?;
        let password_hash = hash_password(&new_user.password)?;

        let mut state = self.lock();
        if state.usernames.contains_key(&new_user.username) {
            return Err(AuthError::storage(format!(
                "username '{}' already exists",
                new_user.username
            )));
        }

        let mut user = User::new(new_user.username.clone());
        user.email = new_user.email;

        state.usernames.insert(new_user.username, user.id);
        state.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    async fn verify_password(&self, user_id: Uuid, password: &str) -> AuthResult<bool> {
        let hash = {
            let state = self.lock();
            let record = state
                .users
                .get(&user_id)
                .ok_or_else(|| AuthError::storage(format!("user {user_id} not found")))?;
            record.password_hash.clone()
        };
        verify_password(&hash, password)
    }

    async fn record_failure(&self, user_id: Uuid) -> AuthResult<FailureOutcome> {
        let mut state = self.lock();
        let record = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::storage(format!("user {user_id} not found")))?;

        let now = OffsetDateTime::now_utc();
        record.user.failed_count += 1;
        record.user.updated_at = now;

        let locked_until = if record.user.failed_count >= self.lockout.max_failures {
            let until = now + self.lockout.duration;
            record.user.locked_until = Some(until);
            Some(until)
        } else {
            None
        };

        Ok(FailureOutcome {
            failed_count: record.user.failed_count,
            locked_until,
        })
    }

    async fn reset_failures(&self, user_id: Uuid) -> AuthResult<()> {
        let mut state = self.lock();
        let record = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthError::storage(format!("user {user_id} not found")))?;

        record.user.failed_count = 0;
        record.user.locked_until = None;
        record.user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryAuthStore {
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<Role>> {
        let state = self.lock();
        Ok(state
            .role_names
            .get(name)
            .and_then(|id| state.roles.get(id))
            .cloned())
    }

    async fn create(&self, role: &Role) -> AuthResult<()> {
        let mut state = self.lock();
        if state.role_names.contains_key(&role.name) {
            return Err(AuthError::storage(format!(
                "role '{}' already exists",
                role.name
            )));
        }
        state.role_names.insert(role.name.clone(), role.id);
        state.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn is_member(&self, user_id: Uuid, role_id: Uuid) -> AuthResult<bool> {
        let state = self.lock();
        Ok(state.memberships.contains(&(user_id, role_id)))
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AuthResult<()> {
        let mut state = self.lock();
        if !state.users.contains_key(&user_id) {
            return Err(AuthError::storage(format!("user {user_id} not found")));
        }
        if !state.roles.contains_key(&role_id) {
            return Err(AuthError::storage(format!("role {role_id} not found")));
        }
        if !state.memberships.contains(&(user_id, role_id)) {
            state.memberships.push((user_id, role_id));
        }
        Ok(())
    }

    async fn role_names(&self, user_id: Uuid) -> AuthResult<Vec<String>> {
        let state = self.lock();
        Ok(state
            .memberships
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, rid)| state.roles.get(rid))
            .map(|role| role.name.clone())
            .collect())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> MemoryAuthStore {
        MemoryAuthStore::with_defaults()
    }

    // `create` exists on both traits, so calls below qualify the trait.
    async fn seeded_user(store: &MemoryAuthStore) -> User {
        CredentialStore::create(store, NewUser::new("alice", "alice@example.com", "Passw0rd"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = store();
        let user = seeded_user(&store).await;

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, Some("alice@example.com".to_string()));

        assert!(store.find_by_username("bob").await.unwrap().is_none());
        // Usernames are matched case-sensitively.
        assert!(store.find_by_username("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_username() {
        let store = store();
        seeded_user(&store).await;

        let result = CredentialStore::create(
            &store,
            NewUser::new("alice", "other@example.com", "Passw0rd"),
        )
        .await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_create_enforces_password_policy() {
        let store = store();
        let result =
            CredentialStore::create(&store, NewUser::new("alice", "alice@example.com", "weak"))
                .await;
        assert!(matches!(result, Err(AuthError::PasswordPolicy { .. })));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_password() {
        let store = store();
        let user = seeded_user(&store).await;

        assert!(store.verify_password(user.id, "Passw0rd").await.unwrap());
        assert!(!store.verify_password(user.id, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_failure_counts_up_and_locks_at_threshold() {
        let store = MemoryAuthStore::new(
            PasswordPolicy::default(),
            LockoutPolicy {
                max_failures: 3,
                duration: Duration::from_secs(900),
            },
        );
        let user =
            CredentialStore::create(&store, NewUser::new("alice", "a@example.com", "Passw0rd"))
                .await
                .unwrap();

        let first = store.record_failure(user.id).await.unwrap();
        assert_eq!(first.failed_count, 1);
        assert!(!first.lockout_triggered());

        let second = store.record_failure(user.id).await.unwrap();
        assert_eq!(second.failed_count, 2);
        assert!(!second.lockout_triggered());

        let third = store.record_failure(user.id).await.unwrap();
        assert_eq!(third.failed_count, 3);
        assert!(third.lockout_triggered());

        let user = store.find_by_username("alice").await.unwrap().unwrap();
        assert!(user.is_locked_out(OffsetDateTime::now_utc()));
    }

    #[tokio::test]
    async fn test_reset_failures_clears_counter_and_lockout() {
        let store = MemoryAuthStore::new(
            PasswordPolicy::default(),
            LockoutPolicy {
                max_failures: 1,
                duration: Duration::from_secs(900),
            },
        );
        let user =
            CredentialStore::create(&store, NewUser::new("alice", "a@example.com", "Passw0rd"))
                .await
                .unwrap();

        store.record_failure(user.id).await.unwrap();
        store.reset_failures(user.id).await.unwrap();

        let user = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.failed_count, 0);
        assert!(user.locked_until.is_none());
    }

    #[tokio::test]
    async fn test_role_create_and_membership() {
        let store = store();
        let user = seeded_user(&store).await;

        let role = Role::new("subscriptor");
        RoleStore::create(&store, &role).await.unwrap();
        assert!(store.find_by_name("subscriptor").await.unwrap().is_some());

        assert!(!store.is_member(user.id, role.id).await.unwrap());
        store.assign(user.id, role.id).await.unwrap();
        assert!(store.is_member(user.id, role.id).await.unwrap());

        // Re-assignment stays a single membership.
        store.assign(user.id, role.id).await.unwrap();
        assert_eq!(store.membership_count(), 1);
    }

    #[tokio::test]
    async fn test_role_names_in_assignment_order() {
        let store = store();
        let user = seeded_user(&store).await;

        let subscriptor = Role::new("subscriptor");
        let editor = Role::new("editor");
        RoleStore::create(&store, &subscriptor).await.unwrap();
        RoleStore::create(&store, &editor).await.unwrap();

        store.assign(user.id, subscriptor.id).await.unwrap();
        store.assign(user.id, editor.id).await.unwrap();

        let names = store.role_names(user.id).await.unwrap();
        assert_eq!(names, vec!["subscriptor", "editor"]);
    }

    #[tokio::test]
    async fn test_duplicate_role_name_rejected() {
        let store = store();
        RoleStore::create(&store, &Role::new("subscriptor")).await.unwrap();

        let result = RoleStore::create(&store, &Role::new("subscriptor")).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
        assert_eq!(store.role_count(), 1);
    }
}
