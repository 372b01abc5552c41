//! Account registration and user listing endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use catalog_core::Role;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Registration request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterRequest {
    /// Field checks that don't need the database.
    ///
    /// Administrator accounts are provisioned out of band, never through
    /// this endpoint.
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".to_owned()));
        }
        if self.role.is_administrator() {
            return Err(AppError::Validation(
                "role must be seller or customer".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Register a new seller or customer account.
///
/// POST /user/register
///
/// # Errors
///
/// Returns `400` for an invalid payload and `409` when the email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    payload.validate()?;

    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth
        .register(
            payload.username.trim(),
            &payload.email,
            &payload.password,
            payload.role,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List every seller account.
///
/// GET /user/sellers (administrator only)
///
/// # Errors
///
/// Returns `401` without a valid token and `403` for non-administrators.
pub async fn sellers(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_sellers().await?;

    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: Role) -> RegisterRequest {
        RegisterRequest {
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "correct horse".to_owned(),
            role,
        }
    }

    #[test]
    fn test_register_accepts_seller_and_customer() {
        assert!(request(Role::Seller).validate().is_ok());
        assert!(request(Role::Customer).validate().is_ok());
    }

    #[test]
    fn test_register_rejects_administrator_role() {
        assert!(matches!(
            request(Role::Administrator).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_register_rejects_blank_username() {
        let mut payload = request(Role::Seller);
        payload.username = "   ".to_owned();
        assert!(matches!(
            payload.validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_register_payload_uses_camel_case() {
        let payload: RegisterRequest = serde_json::from_str(
            r#"{"username":"ada","email":"ada@example.com","password":"pw123456","role":"seller"}"#,
        )
        .expect("deserialize");
        assert_eq!(payload.role, Role::Seller);
    }
}
