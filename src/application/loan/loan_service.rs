use chrono::{DateTime, Utc};

use crate::application::ServiceDependencies;
use crate::domain::{
    self,
    commands::{BorrowBook, ReturnBook},
    loan::{ActiveLoan, ReturnedLoan},
};

use super::errors::{LoanApplicationError, Result};

/// 返却結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub loan: ReturnedLoan,
    /// 貸出からの経過日数（切り上げ）
    pub elapsed_days: i64,
    /// 今回の返却で課されたペナルティ期限
    pub penalty_until: Option<DateTime<Utc>>,
}

/// 書籍を借りる
///
/// ビジネスルール（最初に失敗した条件が採用される）：
/// - 会員が存在すること
/// - 会員がペナルティ期間中でないこと
/// - 会員の貸出中の冊数が2冊未満であること
/// - 書籍に貸出中の貸出がないこと
/// - 書籍が存在し、総在庫数が1以上であること
///
/// 判定はスナップショットに対する純粋関数で行い、承認後の記録時に台帳が
/// 書籍単位・会員単位の不変条件を原子的に再確認する。
/// 判定と記録の間に他の要求が割り込んだ場合も、台帳の拒否が同じエラーになる。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<ActiveLoan> {
    // 1. 会員の存在確認
    let member = deps
        .member_ledger
        .find_member(cmd.member_id)
        .await?
        .ok_or(LoanApplicationError::MemberNotFound)?;

    // 2. 判定に必要な台帳の状態を並行して取得
    let (active_loans, loan_on_book, book) = futures::try_join!(
        deps.loan_ledger.count_active_loans(cmd.member_id),
        deps.loan_ledger.find_active_loan_by_book(cmd.book_id),
        deps.book_ledger.find_book(cmd.book_id),
    )?;

    // 3. ドメイン層の純粋関数で判定
    if let Err(rejection) = domain::loan::check_borrow_eligibility(
        &member,
        active_loans,
        loan_on_book.is_some(),
        book.as_ref(),
        cmd.borrowed_at,
    ) {
        tracing::info!(
            member_id = %cmd.member_id.value(),
            book_id = %cmd.book_id.value(),
            ?rejection,
            "borrow rejected"
        );
        return Err(rejection.into());
    }

    // 4. 貸出を生成して記録（台帳が不変条件を原子的に保証）
    let (loan, event) = domain::loan::borrow_book(cmd.book_id, cmd.member_id, cmd.borrowed_at);
    let loan = deps.loan_ledger.insert_loan(loan).await.map_err(|err| {
        tracing::warn!(
            member_id = %cmd.member_id.value(),
            book_id = %cmd.book_id.value(),
            error = %err,
            "borrow lost a race at the ledger"
        );
        LoanApplicationError::from(err)
    })?;

    tracing::info!(
        loan_id = %event.loan_id.value(),
        member_id = %event.member_id.value(),
        book_id = %event.book_id.value(),
        "book borrowed"
    );

    Ok(loan)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - （会員, 書籍）の組に一致する貸出中の貸出があること
/// - 経過日数（切り上げ）が7日を超えた場合、返却時刻 + 3日のペナルティ
///   （既存のペナルティ期限は上書きする）
///
/// 返却の記録は「貸出中である場合のみ」の条件付き更新で行い、
/// 同時に2回返却された場合は後着側が競合エラーになる。
/// ペナルティは返却と同じ台帳操作で記録するため、片方だけが残ることはない。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<ReturnReceipt> {
    // 1. 貸出中の貸出を特定
    let active = deps
        .loan_ledger
        .find_active_loan(cmd.member_id, cmd.book_id)
        .await?
        .ok_or(LoanApplicationError::ActiveLoanNotFound)?;

    // 2. ドメイン層の純粋関数を呼び出し
    let (returned, event) = domain::loan::return_book(active, cmd.returned_at);

    // 3. 返却と（延滞時の）ペナルティを1つの台帳操作で記録
    let loan = deps
        .loan_ledger
        .update_loan_as_returned(returned.loan_id, returned.returned_at, event.penalty_until)
        .await?;

    if let Some(until) = event.penalty_until {
        tracing::info!(
            member_id = %event.member_id.value(),
            elapsed_days = event.elapsed_days,
            penalty_until = %until,
            "late return penalized"
        );
    }

    tracing::info!(
        loan_id = %event.loan_id.value(),
        member_id = %event.member_id.value(),
        book_id = %event.book_id.value(),
        elapsed_days = event.elapsed_days,
        "book returned"
    );

    Ok(ReturnReceipt {
        loan,
        elapsed_days: event.elapsed_days,
        penalty_until: event.penalty_until,
    })
}
