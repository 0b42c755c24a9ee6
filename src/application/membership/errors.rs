use thiserror::Error;

use crate::application::ErrorKind;
use crate::ports::{CredentialError, LedgerError};

/// 会員管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum MembershipError {
    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 名前またはコードが既に使われている
    #[error("Member name or code is already taken")]
    DuplicateMember,

    /// 名前またはパスワードが違う（どちらが違うかは区別しない）
    #[error("Invalid name or password")]
    InvalidCredentials,

    /// トークンが不正・期限切れ・種別違い
    #[error("Invalid or expired token")]
    InvalidToken,

    /// 入力が不正
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// ハッシュ計算・署名の内部失敗
    #[error("Credential backend failure")]
    Credential(#[source] CredentialError),

    /// 台帳に到達できない
    #[error("Ledger unavailable")]
    Unavailable(#[source] LedgerError),
}

impl MembershipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MembershipError::MemberNotFound => ErrorKind::NotFound,
            MembershipError::DuplicateMember => ErrorKind::Conflict,
            MembershipError::InvalidCredentials | MembershipError::InvalidToken => {
                ErrorKind::Unauthorized
            }
            MembershipError::InvalidInput(_) => ErrorKind::Invalid,
            MembershipError::Credential(_) | MembershipError::Unavailable(_) => {
                ErrorKind::Unavailable
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MembershipError::MemberNotFound => "MEMBER_NOT_FOUND",
            MembershipError::DuplicateMember => "DUPLICATE_MEMBER",
            MembershipError::InvalidCredentials => "INVALID_CREDENTIALS",
            MembershipError::InvalidToken => "INVALID_TOKEN",
            MembershipError::InvalidInput(_) => "INVALID_INPUT",
            MembershipError::Credential(_) | MembershipError::Unavailable(_) => {
                "SERVICE_UNAVAILABLE"
            }
        }
    }
}

impl From<LedgerError> for MembershipError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateKey(_) => MembershipError::DuplicateMember,
            other => MembershipError::Unavailable(other),
        }
    }
}

impl From<CredentialError> for MembershipError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Invalid => MembershipError::InvalidToken,
            other => MembershipError::Credential(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, MembershipError>;
