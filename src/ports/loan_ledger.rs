use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Result;
use crate::domain::loan::{ActiveLoan, Loan, ReturnedLoan};
use crate::domain::value_objects::{BookId, LoanId, MemberId};

/// 貸出台帳ポート
///
/// 貸出中・返却済みの状態を持つ唯一の情報源。
/// 書籍・会員の貸出可否はここから都度導出する。
#[async_trait]
pub trait LoanLedger: Send + Sync {
    /// 会員の貸出中の冊数
    async fn count_active_loans(&self, member_id: MemberId) -> Result<usize>;

    /// 書籍の貸出中の貸出（書籍ごとに高々1件）
    async fn find_active_loan_by_book(&self, book_id: BookId) -> Result<Option<ActiveLoan>>;

    /// （会員, 書籍）の組に一致する貸出中の貸出
    async fn find_active_loan(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> Result<Option<ActiveLoan>>;

    /// 貸出を記録する
    ///
    /// 次の不変条件を原子的に保証する：
    /// - 書籍ごとの貸出中は1件まで（違反時 `LedgerError::BookAlreadyOnLoan`）
    /// - 会員ごとの貸出中は上限まで（違反時 `LedgerError::LoanLimitReached`）
    async fn insert_loan(&self, loan: ActiveLoan) -> Result<ActiveLoan>;

    /// 貸出を返却済みにする
    ///
    /// 貸出中である場合のみ更新する。既に返却済みなら `LedgerError::StaleWrite`。
    /// `penalty_until` が指定された場合は会員のペナルティ期限も同じ操作で上書きする。
    /// どちらかが失敗した場合はどちらも記録しない（会員が存在しなければ `StaleWrite`）。
    async fn update_loan_as_returned(
        &self,
        loan_id: LoanId,
        returned_at: DateTime<Utc>,
        penalty_until: Option<DateTime<Utc>>,
    ) -> Result<ReturnedLoan>;

    /// 全ての貸出中の貸出
    async fn list_active_loans(&self) -> Result<Vec<ActiveLoan>>;

    /// 全ての貸出（貸出日時の新しい順）
    async fn list_loans(&self) -> Result<Vec<Loan>>;

    /// 書籍に貸出履歴があるか
    async fn has_loan_history(&self, book_id: BookId) -> Result<bool>;
}
