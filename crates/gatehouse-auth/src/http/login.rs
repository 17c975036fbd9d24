//! Login endpoint handler.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::error::AuthError;
use crate::http::ApiState;

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username to authenticate.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// `POST /login`: authenticate and return the serialized bearer token.
///
/// # Errors
///
/// `400` for invalid credentials or an active lockout, `500` for store
/// failures.
pub async fn login_handler(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<String, AuthError> {
    state
        .login
        .login(&request.username, &request.password)
        .await
}
