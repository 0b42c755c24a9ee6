use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::application::ErrorKind;
use crate::domain::BorrowRejection;
use crate::ports::LedgerError;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// （会員, 書籍）に一致する貸出中の貸出がない
    #[error("Active loan not found")]
    ActiveLoanNotFound,

    /// ペナルティ期間中
    #[error("Member is penalized until {until}")]
    MemberPenalized { until: DateTime<Utc> },

    /// 貸出上限（2冊）に達している
    #[error("Borrow limit reached (max 2 books)")]
    BorrowLimitReached,

    /// 書籍が貸出中、または在庫なし
    #[error("Book is not available to borrow")]
    BookUnavailable,

    /// 他の要求と競合した
    #[error("Loan was modified concurrently")]
    ConcurrentMutation,

    /// 台帳に到達できない
    #[error("Ledger unavailable")]
    Unavailable(#[source] LedgerError),
}

impl LoanApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanApplicationError::MemberNotFound
            | LoanApplicationError::BookNotFound
            | LoanApplicationError::ActiveLoanNotFound => ErrorKind::NotFound,
            LoanApplicationError::MemberPenalized { .. }
            | LoanApplicationError::BorrowLimitReached
            | LoanApplicationError::BookUnavailable => ErrorKind::Forbidden,
            LoanApplicationError::ConcurrentMutation => ErrorKind::Conflict,
            LoanApplicationError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// クライアントへ返す機械可読なコード
    pub fn code(&self) -> &'static str {
        match self {
            LoanApplicationError::MemberNotFound => "MEMBER_NOT_FOUND",
            LoanApplicationError::BookNotFound => "BOOK_NOT_FOUND",
            LoanApplicationError::ActiveLoanNotFound => "ACTIVE_LOAN_NOT_FOUND",
            LoanApplicationError::MemberPenalized { .. } => "MEMBER_PENALIZED",
            LoanApplicationError::BorrowLimitReached => "BORROW_LIMIT_REACHED",
            LoanApplicationError::BookUnavailable => "BOOK_UNAVAILABLE",
            LoanApplicationError::ConcurrentMutation => "CONCURRENT_MUTATION",
            LoanApplicationError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<BorrowRejection> for LoanApplicationError {
    fn from(rejection: BorrowRejection) -> Self {
        match rejection {
            BorrowRejection::Penalized { until } => LoanApplicationError::MemberPenalized { until },
            BorrowRejection::BorrowLimitReached => LoanApplicationError::BorrowLimitReached,
            BorrowRejection::BookUnavailable => LoanApplicationError::BookUnavailable,
            BorrowRejection::BookNotFound => LoanApplicationError::BookNotFound,
        }
    }
}

impl From<LedgerError> for LoanApplicationError {
    /// 台帳が原子的に検出した競合は、判定関数と同じ拒否理由として扱う
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::BookAlreadyOnLoan => LoanApplicationError::BookUnavailable,
            LedgerError::LoanLimitReached => LoanApplicationError::BorrowLimitReached,
            LedgerError::StaleWrite => LoanApplicationError::ConcurrentMutation,
            other => LoanApplicationError::Unavailable(other),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
