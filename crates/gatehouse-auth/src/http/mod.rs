//! Axum HTTP handlers for the auth endpoints.
//!
//! The handlers adapt [`LoginService`](crate::login::LoginService) and
//! [`RegistrationService`](crate::registration::RegistrationService) to the
//! wire: JSON request bodies in, a plain token string (login) or `"Ok"`
//! (register) out. Client-caused failures map to `400` with the error's
//! short message; everything else maps to `500` without detail.

pub mod login;
pub mod register;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::AuthError;
use crate::login::LoginService;
use crate::registration::RegistrationService;

pub use login::{LoginRequest, login_handler};
pub use register::{RegisterRequest, register_handler};

/// Shared state for the auth endpoints.
#[derive(Clone)]
pub struct ApiState {
    /// Login flow.
    pub login: Arc<LoginService>,
    /// Registration flow.
    pub registration: Arc<RegistrationService>,
}

impl ApiState {
    /// Creates the endpoint state.
    #[must_use]
    pub fn new(login: Arc<LoginService>, registration: Arc<RegistrationService>) -> Self {
        Self {
            login,
            registration,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            (StatusCode::BAD_REQUEST, self.to_string()).into_response()
        } else {
            // Detail stays in the logs; clients get a fixed message.
            error!(error = %self, detail = ?self.detail(), "request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_client_errors_map_to_400() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::account_locked(OffsetDateTime::now_utc()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::user_creation_failed("dup").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_map_to_500() {
        let response = AuthError::storage("connection refused").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AuthError::internal("bug").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
