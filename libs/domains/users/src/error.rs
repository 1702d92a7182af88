use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Why a sign-in attempt was refused.
///
/// The string forms are the stable error names returned to sign-in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum CredentialErrorKind {
    #[strum(serialize = "InvalidEmailPasswordError")]
    InvalidEmailPassword,
    #[strum(serialize = "InactiveAccountError")]
    InactiveAccount,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Email already exists: {0}. Please use a different email")]
    Conflict(String),

    #[error("Invalid MongoDB identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid or unknown activation code")]
    InvalidCode,

    #[error("Activation code has expired")]
    CodeExpired,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(CredentialErrorKind),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Conflict(_) => AppError::Conflict(err.to_string()),
            UserError::InvalidIdentifier(_) => AppError::InvalidObjectId(err.to_string()),
            UserError::InvalidCode => AppError::BadRequest(err.to_string()),
            UserError::CodeExpired => AppError::Gone(err.to_string()),
            UserError::InvalidCredentials(kind) => AppError::Unauthorized(kind.to_string()),
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::Validation(errors) => AppError::ValidationError(errors),
            UserError::PasswordHash(msg) | UserError::Database(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for UserError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        UserError::Internal(err.to_string())
    }
}
