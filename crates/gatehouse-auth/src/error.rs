//! Authentication error types.
//!
//! This module defines all error types that can occur during login and
//! registration operations. Store failures are carried with their detail
//! internally; the HTTP layer exposes only the short message.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The username is unknown or the password is wrong.
    ///
    /// Both cases collapse into one message so responses do not reveal
    /// whether an account exists.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The account is locked out after repeated failed attempts.
    #[error("Account locked until {}", format_timestamp(.locked_until))]
    AccountLocked {
        /// When the lockout ends.
        locked_until: OffsetDateTime,
    },

    /// The default role could not be created during registration.
    #[error("Failed to create role")]
    RoleCreationFailed {
        /// Store-level failure detail (not exposed to clients).
        detail: String,
    },

    /// The user account could not be created during registration.
    #[error("Failed to create user")]
    UserCreationFailed {
        /// Store-level failure detail (not exposed to clients).
        detail: String,
    },

    /// The default role could not be assigned during registration.
    #[error("Failed to assign role")]
    RoleAssignmentFailed {
        /// Store-level failure detail (not exposed to clients).
        detail: String,
    },

    /// A password did not satisfy the configured policy.
    #[error("Password policy violation: {message}")]
    PasswordPolicy {
        /// Which requirements were not met.
        message: String,
    },

    /// An error occurred while reading or writing auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

fn format_timestamp(ts: &OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

impl AuthError {
    /// Creates a new `AccountLocked` error.
    #[must_use]
    pub fn account_locked(locked_until: OffsetDateTime) -> Self {
        Self::AccountLocked { locked_until }
    }

    /// Creates a new `RoleCreationFailed` error.
    #[must_use]
    pub fn role_creation_failed(detail: impl Into<String>) -> Self {
        Self::RoleCreationFailed {
            detail: detail.into(),
        }
    }

    /// Creates a new `UserCreationFailed` error.
    #[must_use]
    pub fn user_creation_failed(detail: impl Into<String>) -> Self {
        Self::UserCreationFailed {
            detail: detail.into(),
        }
    }

    /// Creates a new `RoleAssignmentFailed` error.
    #[must_use]
    pub fn role_assignment_failed(detail: impl Into<String>) -> Self {
        Self::RoleAssignmentFailed {
            detail: detail.into(),
        }
    }

    /// Creates a new `PasswordPolicy` error.
    #[must_use]
    pub fn password_policy(message: impl Into<String>) -> Self {
        Self::PasswordPolicy {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::AccountLocked { .. }
                | Self::RoleCreationFailed { .. }
                | Self::UserCreationFailed { .. }
                | Self::RoleAssignmentFailed { .. }
                | Self::PasswordPolicy { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns `true` if this error came out of the login flow rather than
    /// registration or infrastructure.
    #[must_use]
    pub fn is_login_error(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::AccountLocked { .. })
    }

    /// Internal failure detail, if this error carries one.
    ///
    /// Details are meant for logs; client responses use the display message.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::RoleCreationFailed { detail }
            | Self::UserCreationFailed { detail }
            | Self::RoleAssignmentFailed { detail } => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );

        let err = AuthError::account_locked(datetime!(2026-01-02 03:04:05 UTC));
        assert_eq!(err.to_string(), "Account locked until 2026-01-02T03:04:05Z");

        let err = AuthError::role_creation_failed("duplicate key");
        assert_eq!(err.to_string(), "Failed to create role");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::InvalidCredentials;
        assert!(err.is_client_error());
        assert!(err.is_login_error());
        assert!(!err.is_server_error());

        let err = AuthError::user_creation_failed("conflict");
        assert!(err.is_client_error());
        assert!(!err.is_login_error());

        let err = AuthError::storage("connection refused");
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_detail_is_internal_only() {
        let err = AuthError::role_assignment_failed("fk violation on user_roles");
        assert_eq!(err.detail(), Some("fk violation on user_roles"));
        assert!(!err.to_string().contains("fk violation"));

        assert_eq!(AuthError::InvalidCredentials.detail(), None);
    }
}
