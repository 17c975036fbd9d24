//! # gatehouse-auth
//!
//! Authentication core for the Gatehouse service.
//!
//! This crate provides:
//! - Credential verification with failure counting and lockout
//! - HS256 bearer-token issuance with name and role claims
//! - Idempotent account bootstrap (default role, user, membership)
//! - Axum HTTP handlers for the login and registration endpoints
//!
//! ## Overview
//!
//! Two services hold all the flow logic. [`login::LoginService`] runs
//! lookup → lockout check → password verify → counter update → token
//! issuance → session-cache write. [`registration::RegistrationService`]
//! runs the three-step check-then-act bootstrap. Persistent state lives
//! behind the [`store`] traits; backends plug in from their own crates.
//!
//! ## Modules
//!
//! - [`config`] - Authentication configuration
//! - [`error`] - Error types shared across the crate
//! - [`token`] - Claims model and HS256 token issuer
//! - [`store`] - Credential/role store traits and the in-memory backend
//! - [`login`] - Login flow
//! - [`registration`] - Registration flow
//! - [`http`] - Axum handlers for the HTTP surface

pub mod config;
pub mod error;
pub mod http;
pub mod login;
pub mod registration;
pub mod store;
pub mod token;

pub use config::{AuthConfig, ConfigError, LockoutPolicy, PasswordPolicy};
pub use error::AuthError;
pub use http::{ApiState, LoginRequest, RegisterRequest, login_handler, register_handler};
pub use login::{LoginService, TokenCache};
pub use registration::RegistrationService;
pub use store::{
    CredentialStore, FailureOutcome, MemoryAuthStore, NewUser, Role, RoleStore, User,
};
pub use token::{TokenClaims, TokenError, TokenIssuer};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;
