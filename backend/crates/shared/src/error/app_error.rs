//! Application Error
//!
//! [`AppError`] is what every domain error becomes right before it is
//! rendered as `{"errors": {...}}`.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::fields::FieldErrors;
use super::kind::ErrorKind;

/// アプリケーション統一エラー型
///
/// ドメイン固有のエラー（`ConduitError` など）はレスポンス生成時にこの型へ変換されます。
/// `fields` が空のときは `message` が `"body"` キーで返されます。
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, fields::FieldErrors};
///
/// let err = AppError::unprocessable("validation failed")
///     .with_field_errors(FieldErrors::single("email", "is invalid"));
/// assert_eq!(err.status_code(), 422);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    fields: FieldErrors,
    /// 元のエラー（ログ用、レスポンスには含めない）
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: FieldErrors::new(),
            source: None,
        }
    }

    /// 404
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// 422
    pub fn unprocessable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::UnprocessableEntity, message)
    }

    /// 500
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// 503
    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// フィールド単位のメッセージを付与
    pub fn with_field_errors(mut self, fields: FieldErrors) -> Self {
        self.fields = fields;
        self
    }

    /// 元のエラーを付与
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.fields
    }

    /// レスポンスの `errors` オブジェクト
    ///
    /// 5xx は内部情報を漏らさないよう固定メッセージにします。
    pub fn public_errors(&self) -> FieldErrors {
        if self.kind.is_server_error() {
            FieldErrors::single("body", "Internal server error")
        } else if self.fields.is_empty() {
            FieldErrors::single("body", self.message.clone())
        } else {
            self.fields.clone()
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if !self.fields.is_empty() {
            builder.field("fields", &self.fields);
        }
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if !self.fields.is_empty() {
            write!(f, " ({})", self.fields)?;
        }
        Ok(())
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_win_over_message() {
        let err = AppError::unprocessable("validation failed")
            .with_field_errors(FieldErrors::single("email", "is invalid"));
        assert_eq!(err.public_errors(), FieldErrors::single("email", "is invalid"));
    }

    #[test]
    fn test_message_goes_under_body() {
        let err = AppError::not_found("article not found");
        assert_eq!(err.status_code(), 404);
        assert_eq!(
            err.public_errors(),
            FieldErrors::single("body", "article not found")
        );
    }

    #[test]
    fn test_server_details_stay_private() {
        let err = AppError::service_unavailable("pool timed out after 30s")
            .with_field_errors(FieldErrors::single("db", "10.0.0.3 refused"));
        assert_eq!(
            err.public_errors(),
            FieldErrors::single("body", "Internal server error")
        );
    }

    #[test]
    fn test_source_is_kept_for_logging() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = AppError::internal("Failed to read file").with_source(io_err);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "[Internal Server Error] Failed to read file");
    }
}
