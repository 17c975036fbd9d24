//! Authentication configuration.
//!
//! Configuration types for token signing, account bootstrap, password
//! policy, and lockout behavior. Every section deserializes with defaults so
//! a partial TOML file is enough.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth.token]
//! secret_key = "change-me-to-a-long-random-value"
//! ttl = "1h"
//!
//! [auth.lockout]
//! max_failures = 5
//! duration = "15m"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token signing configuration.
    pub token: TokenSettings,

    /// Account bootstrap configuration.
    pub registration: RegistrationSettings,

    /// Password policy enforced when accounts are created.
    pub password_policy: PasswordPolicy,

    /// Failed-login lockout configuration.
    pub lockout: LockoutPolicy,
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any section is unusable (e.g. empty signing
    /// secret).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.secret_key.is_empty() {
            return Err(ConfigError::MissingSecretKey);
        }
        if self.token.secret_key.len() < 32 {
            return Err(ConfigError::WeakSecretKey {
                length: self.token.secret_key.len(),
            });
        }
        if self.registration.default_role.is_empty() {
            return Err(ConfigError::EmptyDefaultRole);
        }
        if self.lockout.max_failures == 0 {
            return Err(ConfigError::InvalidLockout {
                message: "max_failures must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Token signing configuration.
///
/// The secret's UTF-8 bytes are the HMAC-SHA256 key; tokens expire `ttl`
/// after issuance regardless of any cache lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenSettings {
    /// Shared signing secret.
    pub secret_key: String,

    /// Token lifetime.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Account bootstrap configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationSettings {
    /// Role granted to every newly registered account.
    pub default_role: String,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            default_role: "subscriptor".to_string(),
        }
    }
}

/// Password requirements enforced by credential stores on account creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum password length.
    pub min_length: usize,

    /// Require at least one ASCII digit.
    pub require_digit: bool,

    /// Require at least one lowercase letter.
    pub require_lowercase: bool,

    /// Require at least one uppercase letter.
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
        }
    }
}

impl PasswordPolicy {
    /// Checks a candidate password against the policy.
    ///
    /// # Errors
    ///
    /// Returns a message naming every unmet requirement.
    pub fn check(&self, password: &str) -> Result<(), String> {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(format!("at least {} characters", self.min_length));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push("a digit".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            violations.push("a lowercase letter".to_string());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            violations.push("an uppercase letter".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(format!("password must contain {}", violations.join(", ")))
        }
    }
}

/// Failed-login lockout configuration.
///
/// When an account's failure counter reaches `max_failures`, the account is
/// locked for `duration`. Enforcement lives in the credential store so the
/// count-and-check is atomic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockoutPolicy {
    /// Failed attempts before lockout.
    pub max_failures: u32,

    /// How long a lockout lasts.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            duration: Duration::from_secs(15 * 60),
        }
    }
}

/// Errors produced by [`AuthConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No signing secret was configured.
    #[error("token.secret_key must be set")]
    MissingSecretKey,

    /// The signing secret is too short to be safe.
    #[error("token.secret_key is too short ({length} bytes, need at least 32)")]
    WeakSecretKey {
        /// Configured secret length in bytes.
        length: usize,
    },

    /// The default role name is empty.
    #[error("registration.default_role must not be empty")]
    EmptyDefaultRole,

    /// The lockout section is unusable.
    #[error("invalid lockout configuration: {message}")]
    InvalidLockout {
        /// What is wrong with the section.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        AuthConfig {
            token: TokenSettings {
                secret_key: "0123456789abcdef0123456789abcdef".to_string(),
                ttl: Duration::from_secs(3600),
            },
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token.ttl, Duration::from_secs(3600));
        assert_eq!(config.registration.default_role, "subscriptor");
        assert_eq!(config.password_policy.min_length, 6);
        assert_eq!(config.lockout.max_failures, 5);
        assert_eq!(config.lockout.duration, Duration::from_secs(900));
    }

    #[test]
    fn test_validate_accepts_good_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_secret() {
        let config = AuthConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSecretKey)
        ));
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = valid_config();
        config.token.secret_key = "short".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeakSecretKey { length: 5 })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_max_failures() {
        let mut config = valid_config();
        config.lockout.max_failures = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLockout { .. })
        ));
    }

    #[test]
    fn test_password_policy_accepts_conforming_password() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("Passw0rd").is_ok());
    }

    #[test]
    fn test_password_policy_names_all_violations() {
        let policy = PasswordPolicy::default();
        let message = policy.check("abc").unwrap_err();
        assert!(message.contains("at least 6 characters"));
        assert!(message.contains("a digit"));
        assert!(message.contains("an uppercase letter"));
        assert!(!message.contains("a lowercase letter"));
    }

    #[test]
    fn test_password_policy_relaxed() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
        };
        assert!(policy.check("....").is_ok());
        assert!(policy.check("...").is_err());
    }

    #[test]
    fn test_config_deserializes_from_partial_toml() {
        let config: AuthConfig = toml::from_str(
            r#"
            [token]
            secret_key = "0123456789abcdef0123456789abcdef"
            ttl = "30m"

            [lockout]
            max_failures = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.token.ttl, Duration::from_secs(1800));
        assert_eq!(config.lockout.max_failures, 3);
        // Untouched sections keep their defaults.
        assert_eq!(config.registration.default_role, "subscriptor");
        assert_eq!(config.lockout.duration, Duration::from_secs(900));
    }
}
