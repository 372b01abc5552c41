//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::catalog::CatalogError;
use crate::services::sku::AllocationError;

/// Application-level error type for the catalog server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication or authorization operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authenticated, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflicting state (duplicate key).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request payload failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// SKU allocation gave up.
    #[error("Allocation error: {0}")]
    Allocation(AllocationError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(what) => Self::NotFound(what),
            CatalogError::Forbidden(why) => Self::Forbidden(why),
            CatalogError::Allocation(AllocationError::Repository(e)) => Self::from_repository(e),
            CatalogError::Allocation(e) => Self::Allocation(e),
            CatalogError::Repository(e) => Self::from_repository(e),
        }
    }
}

impl AppError {
    /// Repository errors keep their not-found and conflict semantics when
    /// they surface through a service.
    fn from_repository(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("resource".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }

    /// Whether this error is a server fault worth capturing.
    fn is_server_fault(&self) -> bool {
        match self {
            Self::Database(_) | Self::Allocation(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::TokenEncoding(_) | AuthError::Repository(_) | AuthError::PasswordHash
            ),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Allocation(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::TokenEncoding(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Server faults stay opaque.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Allocation(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
            Self::Auth(err) => match err {
                AuthError::MissingToken => "Authorization token is missing".to_owned(),
                AuthError::InvalidToken => "Invalid token".to_owned(),
                AuthError::TokenExpired => "Token expired".to_owned(),
                AuthError::InvalidCredentials => "Invalid credentials".to_owned(),
                AuthError::Forbidden(why) => why.clone(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_owned()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::TokenEncoding(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
            },
            Self::NotFound(what) => format!("{what} not found"),
            Self::Forbidden(why) | Self::Conflict(why) | Self::Validation(why) => why.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({ "message": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_owned());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::Validation("quantity must not be negative".to_owned());
        assert_eq!(
            err.to_string(),
            "Validation error: quantity must not be negative"
        );
    }

    #[test]
    fn test_auth_errors_map_to_401() {
        for err in [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::TokenExpired,
            AuthError::InvalidCredentials,
        ] {
            assert_eq!(status_of(AppError::Auth(err)), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        assert_eq!(
            status_of(AppError::Forbidden("nope".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::Forbidden("nope".to_owned()))),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_remaining_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("test".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Conflict("test".to_owned())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Validation("test".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Allocation(AllocationError::Exhausted)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_semantics_survive_catalog_errors() {
        let err = AppError::from(CatalogError::Repository(RepositoryError::Conflict(
            "sku already exists".to_owned(),
        )));
        assert_eq!(status_of(err), StatusCode::CONFLICT);

        let err = AppError::from(CatalogError::Repository(RepositoryError::NotFound));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_server_faults_are_opaque() {
        let err = AppError::Internal("connection pool exhausted".to_owned());
        assert_eq!(err.message(), "Internal server error");

        let err = AppError::Allocation(AllocationError::Exhausted);
        assert_eq!(err.message(), "Internal server error");
    }
}
