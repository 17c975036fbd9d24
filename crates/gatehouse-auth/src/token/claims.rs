//! Bearer token claims.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Claims carried by a Gatehouse bearer token.
///
/// A token asserts exactly one identity (`name`) plus zero or more role
/// memberships, bounded by `exp`. There are no issuer or audience claims;
/// deployments are single-tenant and validation ignores both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Username of the authenticated subject.
    pub name: String,

    /// Role names assigned to the subject, in store-enumeration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,
}

impl TokenClaims {
    /// Creates a new builder for the given subject.
    ///
    /// `iat` is stamped now and `exp` defaults to one hour out.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TokenClaimsBuilder {
        TokenClaimsBuilder::new(name)
    }

    /// Returns `true` if the subject carries the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Expiration as a timestamp value.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

/// Builder for [`TokenClaims`].
pub struct TokenClaimsBuilder {
    name: String,
    roles: Vec<String>,
    exp: i64,
    iat: i64,
}

impl TokenClaimsBuilder {
    fn new(name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            name: name.into(),
            roles: Vec::new(),
            exp: now + 3600,
            iat: now,
        }
    }

    /// Sets the role claims, replacing any previously added.
    #[must_use]
    pub fn roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Adds a single role claim.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Sets the expiration relative to the issue time.
    #[must_use]
    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.exp = self.iat + ttl.whole_seconds();
        self
    }

    /// Builds the claims.
    #[must_use]
    pub fn build(self) -> TokenClaims {
        TokenClaims {
            name: self.name,
            roles: self.roles,
            exp: self.exp,
            iat: self.iat,
        }
    }
}
