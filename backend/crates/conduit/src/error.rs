//! Conduit Error Types
//!
//! This module provides Conduit-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, fields::FieldErrors, kind::ErrorKind};
use thiserror::Error;

/// Conduit-specific result type alias
pub type ConduitResult<T> = Result<T, ConduitError>;

/// Conduit-specific error variants
#[derive(Debug, Error)]
pub enum ConduitError {
    /// Input failed validation (missing envelope, bad field values)
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A store constraint rejected the write, or a relation failed to resolve
    #[error("Integrity error: {0}")]
    Integrity(FieldErrors),

    /// Registration hit an existing username or email
    #[error("User already registered")]
    UserAlreadyRegistered,

    /// Unknown email or wrong password (indistinguishable on purpose)
    #[error("User not found")]
    UserNotFound,

    /// Missing or invalid token on an auth-required route
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not the owner
    #[error("Forbidden")]
    Forbidden,

    /// Named resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConduitError {
    /// Validation error for a single field
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConduitError::Validation(FieldErrors::single(field, message.into()))
    }

    /// Integrity error for a single field
    pub fn integrity(field: &'static str, message: impl Into<String>) -> Self {
        ConduitError::Integrity(FieldErrors::single(field, message.into()))
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConduitError::Validation(_)
            | ConduitError::Integrity(_)
            | ConduitError::UserAlreadyRegistered => ErrorKind::UnprocessableEntity,
            ConduitError::UserNotFound | ConduitError::Unauthorized => ErrorKind::Unauthorized,
            ConduitError::Forbidden => ErrorKind::Forbidden,
            ConduitError::NotFound(_) => ErrorKind::NotFound,
            ConduitError::Database(_) | ConduitError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn into_app_error(self) -> AppError {
        match self {
            ConduitError::Validation(fields) => {
                AppError::unprocessable("Validation failed").with_field_errors(fields)
            }
            ConduitError::Integrity(fields) => {
                AppError::unprocessable("Integrity error").with_field_errors(fields)
            }
            ConduitError::Database(e) => AppError::from(e),
            ConduitError::Internal(msg) => AppError::internal(msg),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ConduitError::Database(e) => {
                tracing::error!(error = %e, "Conduit database error");
            }
            ConduitError::Internal(msg) => {
                tracing::error!(message = %msg, "Conduit internal error");
            }
            ConduitError::Integrity(fields) => {
                tracing::warn!(fields = %fields, "Integrity violation");
            }
            ConduitError::UserNotFound => {
                tracing::warn!("Failed login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Conduit error");
            }
        }
    }
}

impl IntoResponse for ConduitError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<sqlx::Error> for ConduitError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = db_err
                    .constraint()
                    .map(constraint_field)
                    .unwrap_or("body");
                return ConduitError::integrity(field, "has already been taken");
            }
            if db_err.is_foreign_key_violation() {
                return ConduitError::integrity("body", "references a missing record");
            }
            if db_err.is_check_violation() {
                return ConduitError::integrity("body", "violates a constraint");
            }
        }
        ConduitError::Database(err)
    }
}

/// Map a unique constraint name to the field it guards
fn constraint_field(constraint: &str) -> &'static str {
    match constraint {
        "users_username_key" => "username",
        "users_email_key" => "email",
        "articles_slug_key" => "slug",
        _ => "body",
    }
}

impl From<platform::password::PasswordHashError> for ConduitError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        ConduitError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(ConduitError::invalid("title", "can't be blank").kind().status_code(), 422);
        assert_eq!(ConduitError::UserAlreadyRegistered.kind().status_code(), 422);
        assert_eq!(ConduitError::UserNotFound.kind().status_code(), 401);
        assert_eq!(ConduitError::Unauthorized.kind().status_code(), 401);
        assert_eq!(ConduitError::Forbidden.kind().status_code(), 403);
        assert_eq!(ConduitError::NotFound("article").kind().status_code(), 404);
        assert_eq!(ConduitError::Internal("boom".into()).kind().status_code(), 500);
    }

    #[test]
    fn test_validation_keeps_field_errors() {
        let app = ConduitError::invalid("email", "is invalid").into_app_error();
        assert_eq!(app.public_errors(), FieldErrors::single("email", "is invalid"));
    }

    #[test]
    fn test_domain_errors_use_body_key() {
        let app = ConduitError::UserAlreadyRegistered.into_app_error();
        assert_eq!(
            app.public_errors(),
            FieldErrors::single("body", "User already registered")
        );

        let app = ConduitError::NotFound("article").into_app_error();
        assert_eq!(app.public_errors(), FieldErrors::single("body", "article not found"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app = ConduitError::Internal("pool exploded".into()).into_app_error();
        assert_eq!(
            app.public_errors(),
            FieldErrors::single("body", "Internal server error")
        );
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = ConduitError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ConduitError::Database(_)));
    }

    #[test]
    fn test_constraint_field() {
        assert_eq!(constraint_field("users_email_key"), "email");
        assert_eq!(constraint_field("articles_slug_key"), "slug");
        assert_eq!(constraint_field("something_else"), "body");
    }
}
