use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::auth::repo::InsertError;

/// Every way a sign-up, sign-in or profile call can fail.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("password and password repeat do not match")]
    PasswordsNotEqual,
    #[error("identifier is already registered")]
    AlreadyExistId,
    #[error("region not found")]
    RegionNotFound,
    #[error("identifier is not registered")]
    NotRegisteredId,
    #[error("invalid password")]
    InvalidPassword,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::PasswordsNotEqual => StatusCode::BAD_REQUEST,
            AuthError::AlreadyExistId => StatusCode::CONFLICT,
            AuthError::RegionNotFound => StatusCode::NOT_FOUND,
            AuthError::NotRegisteredId => StatusCode::NOT_FOUND,
            AuthError::InvalidPassword => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "invalid_request",
            AuthError::PasswordsNotEqual => "passwords_not_equal",
            AuthError::AlreadyExistId => "already_exist_id",
            AuthError::RegionNotFound => "region_not_found",
            AuthError::NotRegisteredId => "not_registered_id",
            AuthError::InvalidPassword => "invalid_password",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

impl From<InsertError> for AuthError {
    fn from(e: InsertError) -> Self {
        match e {
            InsertError::DuplicateIdentifier => AuthError::AlreadyExistId,
            InsertError::MissingRegion => AuthError::RegionNotFound,
            InsertError::Storage(e) => AuthError::Internal(e),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::Internal(e) => {
                error!(error = ?e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
