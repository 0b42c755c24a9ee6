use std::sync::Arc;

use crate::ports::{BookLedger, LoanLedger, MemberLedger, PasswordHasher, TokenIssuer};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各サービスの関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub member_ledger: Arc<dyn MemberLedger>,
    pub book_ledger: Arc<dyn BookLedger>,
    pub loan_ledger: Arc<dyn LoanLedger>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_issuer: Arc<dyn TokenIssuer>,
}
