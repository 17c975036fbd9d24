//! Token generation and validation.

pub mod claims;
pub mod issuer;

pub use claims::{TokenClaims, TokenClaimsBuilder};
pub use issuer::{TokenError, TokenIssuer};
