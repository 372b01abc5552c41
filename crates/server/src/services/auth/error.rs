//! Authentication and authorization error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication and authorization.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("authorization token is missing")]
    MissingToken,

    /// Token signature or encoding is invalid.
    #[error("invalid token")]
    InvalidToken,

    /// Token is past its encoded expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token could not be signed.
    #[error("token encoding failed: {0}")]
    TokenEncoding(String),

    /// Authenticated, but not allowed to perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("account already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] catalog_core::EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
