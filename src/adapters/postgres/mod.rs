pub mod book_ledger;
pub mod loan_ledger;
pub mod member_ledger;

// パブリックに型を再エクスポート
pub use book_ledger::BookLedger as PostgresBookLedger;
pub use loan_ledger::LoanLedger as PostgresLoanLedger;
pub use member_ledger::MemberLedger as PostgresMemberLedger;

use crate::ports::LedgerError;

/// sqlxのエラーを台帳エラーに分類する
///
/// 一意制約違反は制約名つきの `DuplicateKey`、外部キー違反は `StillReferenced`、
/// それ以外は `Unavailable` とする。貸出台帳は制約ごとにさらに細かく分類する。
impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("unknown").to_string();
                return LedgerError::DuplicateKey(constraint);
            }
            if db.is_foreign_key_violation() {
                return LedgerError::StillReferenced;
            }
        }
        tracing::error!(error = %err, "postgres ledger call failed");
        LedgerError::unavailable(err)
    }
}

/// 行の値が値オブジェクトの不変条件に反する場合
fn invalid_row<E>(err: E) -> LedgerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::error!(error = %err, "row violates a domain invariant");
    LedgerError::unavailable(err)
}
