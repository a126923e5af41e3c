//! Error Kind
//!
//! The closed set of outcomes a Conduit request can fail with, each tied
//! to one HTTP status.

use std::fmt;

/// エラー種別
///
/// Conduit API は入力・整合性の失敗をすべて 422 にまとめるため、
/// 400 / 409 は使いません。5xx はクライアントに詳細を返さない区分です。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::UnprocessableEntity.status_code(), 422);
/// assert!(ErrorKind::ServiceUnavailable.is_server_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401 - トークンなし・不正、またはログイン失敗
    Unauthorized,
    /// 403 - 所有者以外による変更・削除
    Forbidden,
    /// 404 - slug / username / id に該当なし
    NotFound,
    /// 422 - 入力検証・一意制約・参照整合性エラー
    UnprocessableEntity,
    /// 500 - サーバー内部エラー
    InternalServerError,
    /// 503 - データベース接続不可
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP ステータスコード
    pub const fn status_code(self) -> u16 {
        match self {
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// 5xx かどうか
    pub const fn is_server_error(self) -> bool {
        matches!(
            self,
            ErrorKind::InternalServerError | ErrorKind::ServiceUnavailable
        )
    }

    /// 理由フレーズ
    pub const fn reason(self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorKind; 6] = [
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::UnprocessableEntity,
        ErrorKind::InternalServerError,
        ErrorKind::ServiceUnavailable,
    ];

    #[test]
    fn test_server_errors_are_exactly_5xx() {
        for kind in ALL {
            assert_eq!(kind.is_server_error(), kind.status_code() >= 500, "{kind}");
        }
    }

    #[test]
    fn test_display_uses_reason() {
        assert_eq!(ErrorKind::NotFound.to_string(), "Not Found");
        assert_eq!(ErrorKind::UnprocessableEntity.to_string(), "Unprocessable Entity");
    }
}
