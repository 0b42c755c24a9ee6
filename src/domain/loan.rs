use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, BookBorrowed, BookId, BookReturned, BorrowRejection, LoanId, Member, MemberId};

/// 会員が同時に借りられる冊数の上限
pub const MAX_ACTIVE_LOANS: usize = 2;

/// 延滞とみなす経過日数の閾値（この日数を超えるとペナルティ）
pub const LATE_RETURN_THRESHOLD_DAYS: i64 = 7;

/// ペナルティ期間（日数）
pub const PENALTY_DAYS: i64 = 3;

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Loan集約の共通フィールド
///
/// 貸出中・返却済みの両状態で共有されるコアデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCore {
    // 識別子
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    pub loaned_at: DateTime<Utc>,
}

/// 貸出中状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLoan {
    #[serde(flatten)]
    pub core: LoanCore,
}

impl std::ops::Deref for ActiveLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - returned_atが必須（型で保証）
/// - 終端状態。貸出中へは戻らない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedLoan {
    #[serde(flatten)]
    pub core: LoanCore,
    pub returned_at: DateTime<Utc>,
}

impl std::ops::Deref for ReturnedLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Loan集約の統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Loan {
    Active(ActiveLoan),
    Returned(ReturnedLoan),
}

impl Loan {
    pub fn core(&self) -> &LoanCore {
        match self {
            Loan::Active(active) => &active.core,
            Loan::Returned(returned) => &returned.core,
        }
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, Loan::Returned(_))
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Loan::Active(_) => None,
            Loan::Returned(returned) => Some(returned.returned_at),
        }
    }
}

impl From<ActiveLoan> for Loan {
    fn from(loan: ActiveLoan) -> Self {
        Loan::Active(loan)
    }
}

impl From<ReturnedLoan> for Loan {
    fn from(loan: ReturnedLoan) -> Self {
        Loan::Returned(loan)
    }
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：貸出可否を判定する
///
/// 判定順序（最初に失敗した条件が採用される）：
/// 1. ペナルティ期間中でないこと
/// 2. 貸出中の冊数が上限未満であること
/// 3. 対象書籍に貸出中の貸出がないこと
/// 4. 対象書籍が蔵書に存在すること
/// 5. 対象書籍の総在庫数が1以上であること
///
/// 会員の存在確認は呼び出し側（アプリケーション層）で行う。
pub fn check_borrow_eligibility(
    member: &Member,
    active_loans: usize,
    book_on_loan: bool,
    book: Option<&Book>,
    now: DateTime<Utc>,
) -> Result<(), BorrowRejection> {
    if let Some(until) = member.penalty_until.filter(|_| member.is_penalized(now)) {
        return Err(BorrowRejection::Penalized { until });
    }

    if active_loans >= MAX_ACTIVE_LOANS {
        return Err(BorrowRejection::BorrowLimitReached);
    }

    if book_on_loan {
        return Err(BorrowRejection::BookUnavailable);
    }

    let book = book.ok_or(BorrowRejection::BookNotFound)?;
    if !book.stock.is_positive() {
        return Err(BorrowRejection::BookUnavailable);
    }

    Ok(())
}

/// 純粋関数：書籍を貸し出す
///
/// 在庫数は変更しない。利用可能数は貸出台帳から導出する。
/// 副作用なし。新しいActiveLoanとイベントを返す。
pub fn borrow_book(
    book_id: BookId,
    member_id: MemberId,
    loaned_at: DateTime<Utc>,
) -> (ActiveLoan, BookBorrowed) {
    let loan_id = LoanId::new();

    let loan = ActiveLoan {
        core: LoanCore {
            loan_id,
            book_id,
            member_id,
            loaned_at,
        },
    };

    let event = BookBorrowed {
        loan_id,
        book_id,
        member_id,
        loaned_at,
    };

    (loan, event)
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 経過日数は切り上げ（1秒でも超えれば1日）
/// - 経過日数が7日を超えた場合、返却時刻 + 3日をペナルティ期限とする
///
/// ActiveLoanのみ受け付ける（二重返却は型で排除）。
/// 副作用なし。ReturnedLoanとイベントを返す。
pub fn return_book(loan: ActiveLoan, returned_at: DateTime<Utc>) -> (ReturnedLoan, BookReturned) {
    let elapsed = elapsed_days(loan.loaned_at, returned_at);
    let penalty_until = penalty_expiry(elapsed, returned_at);

    let event = BookReturned {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        member_id: loan.member_id,
        returned_at,
        elapsed_days: elapsed,
        penalty_until,
    };

    let returned_loan = ReturnedLoan {
        core: loan.core,
        returned_at,
    };

    (returned_loan, event)
}

/// 純粋関数：経過日数（切り上げ）
///
/// 時計のずれ等で返却時刻が貸出時刻より前になった場合は0日とする。
pub fn elapsed_days(loaned_at: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    let span = returned_at - loaned_at;
    if span <= Duration::zero() {
        return 0;
    }

    let whole_days = span.num_days();
    if span > Duration::days(whole_days) {
        whole_days + 1
    } else {
        whole_days
    }
}

/// 純粋関数：ペナルティ期限
///
/// 閾値ちょうど（7日）はペナルティなし。
pub fn penalty_expiry(elapsed_days: i64, returned_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (elapsed_days > LATE_RETURN_THRESHOLD_DAYS).then(|| returned_at + Duration::days(PENALTY_DAYS))
}
