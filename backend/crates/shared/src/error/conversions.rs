//! Error conversions - From implementations for common error types
//!
//! Provides automatic conversion from common error types to [`AppError`],
//! and the HTTP rendering of [`AppError`] when the `axum` feature is enabled.

use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            AppError::unprocessable(format!("JSON parse error: {}", err)).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// Classify a PostgreSQL SQLSTATE code
///
/// https://www.postgresql.org/docs/current/errcodes-appendix.html
#[cfg(feature = "sqlx")]
pub fn classify_sqlstate(code: &str) -> ErrorKind {
    match code {
        // Class 23: Integrity Constraint Violation
        "23000" | "23001" | "23502" | "23503" | "23505" | "23514" => {
            ErrorKind::UnprocessableEntity
        }
        // Class 42: Syntax Error or Access Rule Violation
        "42501" => ErrorKind::Forbidden,
        // Class 53: Insufficient Resources
        "53000" | "53100" | "53200" | "53300" => ErrorKind::ServiceUnavailable,
        // Class 57: Operator Intervention
        "57000" | "57014" | "57P01" | "57P02" | "57P03" => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::InternalServerError,
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found").with_source(err),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("Database connection pool exhausted").with_source(err)
            }
            sqlx::Error::Database(db_err) => {
                let kind = db_err
                    .code()
                    .map(|code| classify_sqlstate(code.as_ref()))
                    .unwrap_or(ErrorKind::InternalServerError);
                let message = match kind {
                    ErrorKind::UnprocessableEntity => "Integrity constraint violation",
                    ErrorKind::Forbidden => "Insufficient privilege",
                    ErrorKind::ServiceUnavailable => "Database unavailable",
                    _ => "Database error",
                };
                AppError::new(kind, message).with_source(err)
            }
            sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database connection error").with_source(err)
            }
            _ => AppError::internal("Database error").with_source(err),
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Conduit error body: {"errors": {"<field>": ["message", ...]}}
        let body = serde_json::json!({ "errors": self.public_errors() });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert_eq!(app_err.kind(), ErrorKind::UnprocessableEntity);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_classify_sqlstate() {
        assert_eq!(classify_sqlstate("23505"), ErrorKind::UnprocessableEntity);
        assert_eq!(classify_sqlstate("23503"), ErrorKind::UnprocessableEntity);
        assert_eq!(classify_sqlstate("57P01"), ErrorKind::ServiceUnavailable);
        assert_eq!(classify_sqlstate("XX000"), ErrorKind::InternalServerError);
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_error_body_shape() {
        use axum::response::IntoResponse;

        let response = AppError::not_found("article not found").into_response();
        assert_eq!(response.status().as_u16(), 404);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "errors": { "body": ["article not found"] } })
        );
    }
}
