use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::InMemoryLedger;
use crate::domain::loan::{ActiveLoan, Loan, MAX_ACTIVE_LOANS, ReturnedLoan};
use crate::domain::{BookId, LoanId, MemberId};
use crate::ports::{LedgerError, LoanLedger, Result};

fn active(loans: &[Loan]) -> impl Iterator<Item = &ActiveLoan> {
    loans.iter().filter_map(|loan| match loan {
        Loan::Active(active) => Some(active),
        Loan::Returned(_) => None,
    })
}

#[async_trait]
impl LoanLedger for InMemoryLedger {
    async fn count_active_loans(&self, member_id: MemberId) -> Result<usize> {
        let state = self.lock()?;
        Ok(active(&state.loans)
            .filter(|loan| loan.member_id == member_id)
            .count())
    }

    async fn find_active_loan_by_book(&self, book_id: BookId) -> Result<Option<ActiveLoan>> {
        let state = self.lock()?;
        Ok(active(&state.loans)
            .find(|loan| loan.book_id == book_id)
            .cloned())
    }

    async fn find_active_loan(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> Result<Option<ActiveLoan>> {
        let state = self.lock()?;
        Ok(active(&state.loans)
            .find(|loan| loan.member_id == member_id && loan.book_id == book_id)
            .cloned())
    }

    /// 判定と記録を同じロックの中で行う
    async fn insert_loan(&self, loan: ActiveLoan) -> Result<ActiveLoan> {
        let mut state = self.lock()?;

        // 参照先が消えている場合は外部キー違反と同じ扱い
        if !state.members.contains_key(&loan.member_id) || !state.books.contains_key(&loan.book_id)
        {
            return Err(LedgerError::StaleWrite);
        }

        if active(&state.loans).any(|existing| existing.book_id == loan.book_id) {
            return Err(LedgerError::BookAlreadyOnLoan);
        }

        let member_loans = active(&state.loans)
            .filter(|existing| existing.member_id == loan.member_id)
            .count();
        if member_loans >= MAX_ACTIVE_LOANS {
            return Err(LedgerError::LoanLimitReached);
        }

        state.loans.push(Loan::Active(loan.clone()));
        Ok(loan)
    }

    /// 返却とペナルティを同じロックの中で記録する
    async fn update_loan_as_returned(
        &self,
        loan_id: LoanId,
        returned_at: DateTime<Utc>,
        penalty_until: Option<DateTime<Utc>>,
    ) -> Result<ReturnedLoan> {
        let mut state = self.lock()?;
        let index = state
            .loans
            .iter()
            .position(|loan| !loan.is_returned() && loan.core().loan_id == loan_id)
            .ok_or(LedgerError::StaleWrite)?;

        // 書き込む前に両方の前提を確認する
        let member_id = state.loans[index].core().member_id;
        if penalty_until.is_some() && !state.members.contains_key(&member_id) {
            return Err(LedgerError::StaleWrite);
        }

        let returned = ReturnedLoan {
            core: state.loans[index].core().clone(),
            returned_at,
        };
        state.loans[index] = Loan::Returned(returned.clone());
        if let (Some(until), Some(member)) = (penalty_until, state.members.get_mut(&member_id)) {
            member.penalty_until = Some(until);
        }
        Ok(returned)
    }

    async fn list_active_loans(&self) -> Result<Vec<ActiveLoan>> {
        let state = self.lock()?;
        Ok(active(&state.loans).cloned().collect())
    }

    async fn list_loans(&self) -> Result<Vec<Loan>> {
        let state = self.lock()?;
        let mut loans = state.loans.clone();
        loans.sort_by(|a, b| b.core().loaned_at.cmp(&a.core().loaned_at));
        Ok(loans)
    }

    async fn has_loan_history(&self, book_id: BookId) -> Result<bool> {
        let state = self.lock()?;
        Ok(state.loans.iter().any(|loan| loan.core().book_id == book_id))
    }
}
