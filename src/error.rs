use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CustodyError>;

#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("Invalid credentials")]
    AuthenticationFailure,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Invalid TOTP code")]
    InvalidTotp,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Forbidden")]
    AuthorizationDenied,

    #[error("User not found")]
    UserNotFound,

    #[error("Secret not found")]
    SecretNotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encryption failed")]
    EncryptionFailure,

    #[error("Decryption failed")]
    DecryptionFailure,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Single-field error shape exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl CustodyError {
    /// Map to the caller-visible error message.
    ///
    /// Authentication failures stay opaque: an unknown username and a wrong
    /// password produce the same message. Secret lookups scoped to another
    /// owner report plain not-found so record existence never leaks. Store
    /// and crypto internals are collapsed to a generic message.
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            CustodyError::AuthenticationFailure => "Invalid credentials".to_string(),
            CustodyError::AccountDeactivated => "Account is deactivated".to_string(),
            CustodyError::InvalidTotp => "Invalid TOTP code".to_string(),
            CustodyError::TokenInvalid => "Invalid token".to_string(),
            CustodyError::AuthorizationDenied => "Forbidden".to_string(),
            CustodyError::UserNotFound => "User not found".to_string(),
            CustodyError::SecretNotFound => "Secret not found".to_string(),
            CustodyError::Conflict(msg) => msg.clone(),
            CustodyError::Validation(msg) => msg.clone(),
            CustodyError::EncryptionFailure => "Failed to encrypt secret".to_string(),
            CustodyError::DecryptionFailure => "Failed to decrypt secret".to_string(),
            CustodyError::Database(_) | CustodyError::Internal(_) => {
                // Don't leak internal details to callers
                "Internal server error".to_string()
            }
        };
        ErrorResponse { error }
    }
}

impl From<sqlx::Error> for CustodyError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "database error");
        CustodyError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CustodyError {
    fn from(err: validator::ValidationErrors) -> Self {
        CustodyError::Validation(err.to_string())
    }
}
