use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::{ErrorResponse, FieldError};
use crate::repository::RepoError;

/// AppError
///
/// Every failure a handler or extractor can surface. Client errors carry a
/// user-facing message; server errors are logged and answered with a generic body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Authentication required")]
    Unauthorized,
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("repository error: {0}")]
    Repository(#[source] RepoError),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("session lifetime of {0}s is out of range")]
    SessionTtl(i64),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::EmailTaken => AppError::EmailTaken,
            other => AppError::Repository(other),
        }
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::Repository(_)
            | AppError::Token(_)
            | AppError::PasswordHash(_)
            | AppError::SessionTtl(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(fields) => ErrorResponse {
                error: "Validation failed".to_string(),
                fields,
            },
            ref err if status.is_server_error() => {
                tracing::error!(error = %err, "request failed");
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    fields: Vec::new(),
                }
            }
            err => ErrorResponse {
                error: err.to_string(),
                fields: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}
