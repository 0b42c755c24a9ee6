use std::collections::HashMap;

use crate::application::ServiceDependencies;
use crate::domain::{
    BookAvailability, BookId, MemberId, MemberLoanSummary,
    loan::{ActiveLoan, Loan, LoanCore},
};

use super::errors::Result;

/// 貸出の詳細ビュー（会員名・書籍コード・書籍タイトルを結合）
///
/// 会員や書籍が削除済みの場合、対応する項目は `None`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDetails {
    pub loan: Loan,
    pub member_name: Option<String>,
    pub book_code: Option<String>,
    pub book_title: Option<String>,
}

impl LoanDetails {
    pub fn core(&self) -> &LoanCore {
        self.loan.core()
    }
}

/// 書籍ごとの貸出中冊数
fn count_by_book(loans: &[ActiveLoan]) -> HashMap<BookId, usize> {
    let mut counts = HashMap::new();
    for loan in loans {
        *counts.entry(loan.book_id).or_insert(0) += 1;
    }
    counts
}

/// 全書籍の貸出状況
///
/// 貸出台帳から都度再計算する（キャッシュしない）。
pub async fn list_book_availability(deps: &ServiceDependencies) -> Result<Vec<BookAvailability>> {
    let (books, loans) = futures::try_join!(
        deps.book_ledger.list_all_books(),
        deps.loan_ledger.list_active_loans(),
    )?;
    let counts = count_by_book(&loans);

    Ok(books
        .into_iter()
        .map(|book| {
            let active_loans = counts.get(&book.book_id).copied().unwrap_or(0);
            BookAvailability { book, active_loans }
        })
        .collect())
}

/// 貸出可能な書籍
///
/// 総在庫数が1以上で、かつ貸出中の貸出がない書籍。
pub async fn list_available_books(deps: &ServiceDependencies) -> Result<Vec<BookAvailability>> {
    let books = list_book_availability(deps).await?;
    Ok(books
        .into_iter()
        .filter(BookAvailability::is_available_to_borrow)
        .collect())
}

/// 全会員の貸出中冊数
pub async fn list_members_with_loans(deps: &ServiceDependencies) -> Result<Vec<MemberLoanSummary>> {
    let (members, loans) = futures::try_join!(
        deps.member_ledger.list_all_members(),
        deps.loan_ledger.list_active_loans(),
    )?;

    let mut counts: HashMap<MemberId, usize> = HashMap::new();
    for loan in &loans {
        *counts.entry(loan.member_id).or_insert(0) += 1;
    }

    Ok(members
        .into_iter()
        .map(|member| {
            let active_loans = counts.get(&member.member_id).copied().unwrap_or(0);
            MemberLoanSummary {
                member,
                active_loans,
            }
        })
        .collect())
}

/// 全貸出の詳細
pub async fn list_loans_with_details(deps: &ServiceDependencies) -> Result<Vec<LoanDetails>> {
    let (loans, members, books) = futures::try_join!(
        deps.loan_ledger.list_loans(),
        deps.member_ledger.list_all_members(),
        deps.book_ledger.list_all_books(),
    )?;

    let member_names: HashMap<MemberId, String> = members
        .into_iter()
        .map(|member| (member.member_id, member.name))
        .collect();
    let books: HashMap<BookId, (String, String)> = books
        .into_iter()
        .map(|book| (book.book_id, (book.code, book.title)))
        .collect();

    Ok(loans
        .into_iter()
        .map(|loan| {
            let core = loan.core();
            let member_name = member_names.get(&core.member_id).cloned();
            let (book_code, book_title) = match books.get(&core.book_id) {
                Some((code, title)) => (Some(code.clone()), Some(title.clone())),
                None => (None, None),
            };
            LoanDetails {
                loan,
                member_name,
                book_code,
                book_title,
            }
        })
        .collect())
}

/// 会員の貸出中冊数
pub async fn count_active_loans(deps: &ServiceDependencies, member_id: MemberId) -> Result<usize> {
    Ok(deps.loan_ledger.count_active_loans(member_id).await?)
}
