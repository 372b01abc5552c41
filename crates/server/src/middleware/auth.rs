//! Authentication extractors for route handlers.
//!
//! Each extractor reads the `Authorization: Bearer` header, verifies the
//! token against the application's token service, and attaches the verified
//! [`Identity`] to the handler. Role checks happen here, before the handler
//! body runs; a wrong role is `403` while a missing or bad token is `401`.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use catalog_core::Role;

use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::services::token::Identity;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(caller): RequireAuth) -> impl IntoResponse {
///     format!("hello, user {}", caller.id)
/// }
/// ```
pub struct RequireAuth(pub Identity);

/// Extractor that additionally requires the administrator role.
pub struct RequireAdmin(pub Identity);

/// Extractor that additionally requires the seller role.
pub struct RequireSeller(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(Self(authenticate(parts, state)?))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let identity = authenticate(parts, state)?;
        if !identity.role.is_administrator() {
            return Err(AuthError::Forbidden("administrator access required".to_owned()).into());
        }
        Ok(Self(identity))
    }
}

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let identity = authenticate(parts, state)?;
        if identity.role != Role::Seller {
            return Err(AuthError::Forbidden("seller access required".to_owned()).into());
        }
        Ok(Self(identity))
    }
}

/// Verify the bearer token on a request.
fn authenticate(parts: &Parts, state: &AppState) -> Result<Identity, AuthError> {
    let token = extract_bearer(parts)?;
    state.tokens().verify(token)
}

/// Pull the token out of the `Authorization` header.
///
/// A missing header, a non-Bearer scheme, and an empty token all count as
/// "no token presented" rather than "bad token".
fn extract_bearer(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}
