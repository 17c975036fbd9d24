//! Storage traits for auth data, plus the in-memory implementation.
//!
//! The credential and role stores are the system's only collaborators with
//! persistent state. Services depend on these traits; backends live in
//! their own crates (e.g. `gatehouse-auth-postgres`) or, for development
//! and tests, in [`memory`].

pub mod credentials;
pub mod memory;
pub mod password;
pub mod roles;

pub use credentials::{CredentialStore, FailureOutcome, NewUser, User, UserBuilder};
pub use memory::MemoryAuthStore;
pub use roles::{Role, RoleStore};
