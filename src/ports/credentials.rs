use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Member, MemberId};

/// 認証情報ポートのエラー
#[derive(Debug, Error)]
pub enum CredentialError {
    /// トークンやハッシュが不正、期限切れ、または種別違い
    #[error("invalid credential")]
    Invalid,

    /// ハッシュ計算や署名の内部失敗
    #[error("credential backend failure: {0}")]
    Backend(String),
}

/// トークン種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// 検証済みトークンの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub member_id: MemberId,
    pub name: String,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

/// 発行済みトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// パスワードハッシュポート
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// 一致しない場合は `Ok(false)`。ハッシュ自体が壊れている場合のみエラー。
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, CredentialError>;
}

/// トークン発行ポート
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, member: &Member, kind: TokenKind) -> Result<IssuedToken, CredentialError>;

    /// 署名・期限・発行者・種別を検証する
    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, CredentialError>;
}
