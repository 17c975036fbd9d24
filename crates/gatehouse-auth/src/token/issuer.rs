//! Bearer token issuance and validation.
//!
//! Tokens are standard three-segment JWTs (`header.payload.signature`,
//! base64url) signed with HMAC-SHA256 over a shared secret. The secret's
//! UTF-8 bytes are used as the key directly, matching the verification
//! configuration of the serving boundary.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use time::Duration;

use crate::token::claims::TokenClaims;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    Decoding {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,
}

impl TokenError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Decoding` error.
    #[must_use]
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Returns `true` if the token was well-formed but failed validation.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Expired | Self::InvalidSignature)
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::decoding(err.to_string()),
        }
    }
}

// ============================================================================
// Token Issuer
// ============================================================================

/// Issues and validates HS256 bearer tokens.
///
/// The issuer is `Send + Sync` and intended to be built once from
/// configuration and shared behind an `Arc`.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from the shared secret and configured lifetime.
    #[must_use]
    pub fn new(secret: &str, ttl: std::time::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl.as_secs() as i64),
        }
    }

    /// The lifetime applied by [`TokenIssuer::issue_for`].
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs pre-built claims into a serialized token.
    ///
    /// Deterministic given identical claims and key.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::encoding(e.to_string()))
    }

    /// Builds claims for a subject with the configured TTL and signs them.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn issue_for(&self, username: &str, roles: Vec<String>) -> Result<String, TokenError> {
        let claims = TokenClaims::builder(username)
            .roles(roles)
            .expires_in(self.ttl)
            .build();
        self.issue(&claims)
    }

    /// Decodes and validates a token.
    ///
    /// Validates the signature and expiry only; issuer and audience are
    /// ignored (single-tenant deployment).
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid, the token is expired,
    /// or the payload is malformed.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, std::time::Duration::from_secs(3600))
    }

    #[test]
    fn test_issue_and_decode_round_trip() {
        let issuer = issuer();
        let token = issuer
            .issue_for("alice", vec!["subscriptor".to_string()])
            .unwrap();

        let claims = issuer.decode(&token).unwrap();
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.roles, vec!["subscriptor"]);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wire_format_three_base64url_segments() {
        let issuer = issuer();
        let token = issuer.issue_for("alice", Vec::new()).unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);

        let header = URL_SAFE_NO_PAD.decode(segments[0]).unwrap();
        let header: serde_json::Value = serde_json::from_slice(&header).unwrap();
        assert_eq!(header["alg"], "HS256");

        let payload = URL_SAFE_NO_PAD.decode(segments[1]).unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload["name"], "alice");
    }

    #[test]
    fn test_issue_is_deterministic_for_identical_claims() {
        let issuer = issuer();
        let claims = TokenClaims {
            name: "alice".to_string(),
            roles: vec!["subscriptor".to_string()],
            exp: 4_000_000_000,
            iat: 1_700_000_000,
        };

        assert_eq!(issuer.issue(&claims).unwrap(), issuer.issue(&claims).unwrap());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let claims = TokenClaims::builder("alice")
            .expires_in(Duration::seconds(-3600))
            .build();

        let token = issuer.issue(&claims).unwrap();
        let result = issuer.decode(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = issuer().issue_for("alice", Vec::new()).unwrap();

        let other = TokenIssuer::new(
            "another-secret-another-secret-xx",
            std::time::Duration::from_secs(3600),
        );
        let result = other.decode(&token);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let issuer = issuer();
        let token = issuer.issue_for("alice", Vec::new()).unwrap();

        let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&serde_json::json!({
                "name": "mallory",
                "exp": 4_000_000_000u64,
                "iat": 1_700_000_000u64,
            }))
            .unwrap(),
        );
        segments[1] = forged;

        let result = issuer.decode(&segments.join("."));
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = issuer().decode("not-a-token");
        assert!(matches!(result, Err(TokenError::Decoding { .. })));
    }

    #[test]
    fn test_token_error_predicates() {
        assert!(TokenError::Expired.is_validation_error());
        assert!(TokenError::InvalidSignature.is_validation_error());
        assert!(!TokenError::encoding("x").is_validation_error());
    }
}
