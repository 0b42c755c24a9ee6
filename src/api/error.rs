use crate::application::ErrorKind;
use crate::application::catalog::CatalogError;
use crate::application::loan::LoanApplicationError;
use crate::application::membership::MembershipError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// ステータスコードはエラーの分類（ErrorKind）のみから決める。
#[derive(Debug)]
pub enum ApiError {
    Loan(LoanApplicationError),
    Catalog(CatalogError),
    Membership(MembershipError),
    /// Authorizationヘッダーがない、または形式が不正
    MissingToken(&'static str),
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        ApiError::Membership(err)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl ApiError {
    fn parts(&self) -> (ErrorKind, &'static str, String) {
        match self {
            ApiError::Loan(e) => (e.kind(), e.code(), e.to_string()),
            ApiError::Catalog(e) => (e.kind(), e.code(), e.to_string()),
            ApiError::Membership(e) => (e.kind(), e.code(), e.to_string()),
            ApiError::MissingToken(reason) => {
                (ErrorKind::Unauthorized, "UNAUTHORIZED", reason.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (kind, code, message) = self.parts();

        // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
        let message = if kind == ErrorKind::Unavailable {
            tracing::error!(error = ?self, "request failed: {}", message);
            "Service temporarily unavailable".to_string()
        } else {
            message
        };

        let body = Json(ErrorResponse::new(code, message));
        (status_for(kind), body).into_response()
    }
}
