//! Registration endpoint handler.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::error::AuthError;
use crate::http::ApiState;

/// Request body for `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Username for the new account.
    pub username: String,
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password; checked against the password policy.
    pub password: String,
}

/// `POST /register`: idempotent account bootstrap.
///
/// # Errors
///
/// `400` if any bootstrap step fails, `500` for store failures outside the
/// bootstrap steps themselves.
pub async fn register_handler(
    State(state): State<ApiState>,
    Json(request): Json<RegisterRequest>,
) -> Result<&'static str, AuthError> {
    state
        .registration
        .register(&request.username, &request.email, &request.password)
        .await?;
    Ok("Ok")
}
