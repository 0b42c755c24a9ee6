use async_trait::async_trait;
use std::cmp::Ordering;

use super::InMemoryLedger;
use crate::domain::{Book, BookId, Stock};
use crate::ports::{BookLedger, BookSortField, LedgerError, PageRequest, Result, SortOrder};

fn compare(a: &Book, b: &Book, field: BookSortField) -> Ordering {
    let ordering = match field {
        BookSortField::Code => Ordering::Equal,
        BookSortField::Title => a.title.cmp(&b.title),
        BookSortField::Author => a.author.cmp(&b.author),
        BookSortField::Stock => a.stock.cmp(&b.stock),
    };
    ordering.then_with(|| a.code.cmp(&b.code))
}

#[async_trait]
impl BookLedger for InMemoryLedger {
    async fn insert_book(&self, book: Book) -> Result<Book> {
        let mut state = self.lock()?;
        if state.books.values().any(|b| b.code == book.code) {
            return Err(LedgerError::DuplicateKey("books_code_key".to_string()));
        }
        state.books.insert(book.book_id, book.clone());
        Ok(book)
    }

    async fn find_book(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.lock()?.books.get(&book_id).cloned())
    }

    async fn find_book_by_code(&self, code: &str) -> Result<Option<Book>> {
        Ok(self.lock()?.books.values().find(|b| b.code == code).cloned())
    }

    async fn list_books(&self, request: &PageRequest<BookSortField>) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.lock()?.books.values().cloned().collect();
        books.sort_by(|a, b| {
            let ordering = compare(a, b, request.sort_by);
            match request.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(books
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect())
    }

    async fn list_all_books(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.lock()?.books.values().cloned().collect();
        books.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(books)
    }

    async fn count_books(&self) -> Result<u64> {
        Ok(self.lock()?.books.len() as u64)
    }

    async fn update_book(&self, book: Book) -> Result<Option<Book>> {
        let mut state = self.lock()?;
        if !state.books.contains_key(&book.book_id) {
            return Ok(None);
        }
        if state
            .books
            .values()
            .any(|b| b.code == book.code && b.book_id != book.book_id)
        {
            return Err(LedgerError::DuplicateKey("books_code_key".to_string()));
        }
        state.books.insert(book.book_id, book.clone());
        Ok(Some(book))
    }

    async fn update_stock(&self, book_id: BookId, stock: Stock) -> Result<Option<Book>> {
        let mut state = self.lock()?;
        Ok(state.books.get_mut(&book_id).map(|book| {
            book.stock = stock;
            book.clone()
        }))
    }

    async fn delete_book(&self, book_id: BookId) -> Result<bool> {
        let mut state = self.lock()?;
        if state.loans.iter().any(|loan| loan.core().book_id == book_id) {
            return Err(LedgerError::StillReferenced);
        }
        Ok(state.books.remove(&book_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loan::borrow_book;
    use crate::domain::MemberId;
    use chrono::Utc;

    fn book(code: &str, title: &str, stock: i64) -> Book {
        Book::new(
            code.to_string(),
            title.to_string(),
            "Author".to_string(),
            Stock::try_from(stock).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_book_rejects_duplicate_code() {
        let ledger = InMemoryLedger::new();
        ledger.insert_book(book("JK-45", "Harry Potter", 1)).await.unwrap();

        let result = ledger.insert_book(book("JK-45", "Another", 1)).await;
        assert!(matches!(result, Err(LedgerError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_list_books_sorts_by_stock_desc() {
        let ledger = InMemoryLedger::new();
        ledger.add_book(book("A-1", "One", 1));
        ledger.add_book(book("B-2", "Two", 5));
        ledger.add_book(book("C-3", "Three", 3));

        let request = PageRequest::new(None, None, BookSortField::Stock, SortOrder::Desc);
        let books = ledger.list_books(&request).await.unwrap();
        let codes: Vec<_> = books.iter().map(|b| b.code.as_str()).collect();
        assert_eq!(codes, vec!["B-2", "C-3", "A-1"]);
    }

    #[tokio::test]
    async fn test_update_book_missing_returns_none() {
        let ledger = InMemoryLedger::new();
        let result = ledger.update_book(book("A-1", "One", 1)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_book_refuses_referenced_book() {
        let ledger = InMemoryLedger::new();
        let b = book("A-1", "One", 1);
        let book_id = b.book_id;
        ledger.add_book(b);
        let (loan, _) = borrow_book(book_id, MemberId::new(), Utc::now());
        ledger.add_loan(loan.into());

        let result = ledger.delete_book(book_id).await;
        assert!(matches!(result, Err(LedgerError::StillReferenced)));
    }

    #[tokio::test]
    async fn test_delete_book_reports_missing() {
        let ledger = InMemoryLedger::new();
        assert!(!ledger.delete_book(BookId::new()).await.unwrap());
    }
}
