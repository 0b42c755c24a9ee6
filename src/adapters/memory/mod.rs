//! In-memory ledgers.
//!
//! One `InMemoryLedger` implements all three ledger ports over a single
//! mutex-protected state, so a loan insert checks the book guard and the
//! member cap under the same lock that records it. Used by the tests and by
//! the server when no database URL is configured.

mod book_ledger;
mod loan_ledger;
mod member_ledger;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::loan::Loan;
use crate::domain::{Book, BookId, Member, MemberId};
use crate::ports::{LedgerError, Result};

#[derive(Default)]
struct State {
    members: HashMap<MemberId, Member>,
    books: HashMap<BookId, Book>,
    /// Insertion order.
    loans: Vec<Loan>,
}

/// Mock implementation of the member, book and loan ledgers
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<State>,
    offline: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member for testing purposes
    pub fn add_member(&self, member: Member) {
        if let Ok(mut state) = self.state.lock() {
            state.members.insert(member.member_id, member);
        }
    }

    /// Add a book for testing purposes
    pub fn add_book(&self, book: Book) {
        if let Ok(mut state) = self.state.lock() {
            state.books.insert(book.book_id, book);
        }
    }

    /// Add a loan record as-is, bypassing the invariant checks
    pub fn add_loan(&self, loan: Loan) {
        if let Ok(mut state) = self.state.lock() {
            state.loans.push(loan);
        }
    }

    /// Make every ledger call fail with `LedgerError::Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::unavailable(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "in-memory ledger is offline",
            )));
        }
        self.state
            .lock()
            .map_err(|_| LedgerError::unavailable(std::io::Error::other("ledger lock poisoned")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemberLedger;

    #[tokio::test]
    async fn test_offline_ledger_reports_unavailable() {
        let ledger = InMemoryLedger::new();
        ledger.set_offline(true);

        let result = ledger.find_member(MemberId::new()).await;
        assert!(matches!(result, Err(LedgerError::Unavailable(_))));

        ledger.set_offline(false);
        assert!(ledger.find_member(MemberId::new()).await.unwrap().is_none());
    }
}
