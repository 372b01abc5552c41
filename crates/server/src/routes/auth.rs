//! Login endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::AuthService;
use crate::state::AppState;

/// Login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: a signed bearer token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Authenticate with email and password.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns `401` for an unknown email or wrong password; the two cases are
/// indistinguishable in both the response and its timing.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let token = auth.login(&payload.email, &payload.password).await?;

    Ok(Json(LoginResponse { token }))
}
