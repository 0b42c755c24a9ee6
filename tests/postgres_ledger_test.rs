//! PostgreSQL台帳の統合テスト
//!
//! 実行にはPostgreSQLが必要です：
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::{Duration, TimeZone, Utc};
use library_lending::adapters::postgres::{
    PostgresBookLedger, PostgresLoanLedger, PostgresMemberLedger,
};
use library_lending::application::ServiceDependencies;
use library_lending::application::loan::{self, LoanApplicationError};
use library_lending::domain::commands::{BorrowBook, ReturnBook};
use library_lending::domain::loan::{Loan, borrow_book};
use library_lending::domain::{Book, Member, Stock};
use library_lending::ports::{
    BookLedger, BookSortField, LedgerError, LoanLedger, MemberLedger, PageRequest, SortOrder,
};
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;

mod common;

struct Ledgers {
    members: PostgresMemberLedger,
    books: PostgresBookLedger,
    loans: PostgresLoanLedger,
}

async fn setup() -> (PgPool, Ledgers) {
    let pool = common::create_test_pool().await;
    common::cleanup_database(&pool).await;

    let ledgers = Ledgers {
        members: PostgresMemberLedger::new(pool.clone()),
        books: PostgresBookLedger::new(pool.clone()),
        loans: PostgresLoanLedger::new(pool.clone()),
    };
    (pool, ledgers)
}

fn member(code: &str, name: &str) -> Member {
    Member::new(code.to_string(), name.to_string(), "hash".to_string())
}

fn book(code: &str, stock: i64) -> Book {
    Book::new(
        code.to_string(),
        format!("Title of {}", code),
        "Author".to_string(),
        Stock::try_from(stock).unwrap(),
    )
}

fn postgres_deps(pool: &PgPool) -> ServiceDependencies {
    ServiceDependencies {
        member_ledger: Arc::new(PostgresMemberLedger::new(pool.clone())),
        book_ledger: Arc::new(PostgresBookLedger::new(pool.clone())),
        loan_ledger: Arc::new(PostgresLoanLedger::new(pool.clone())),
        password_hasher: Arc::new(library_lending::adapters::auth::Argon2Hasher::new()),
        token_issuer: common::token_issuer(),
    }
}

// ============================================================================
// 会員台帳
// ============================================================================

#[tokio::test]
#[ignore]
#[serial]
async fn test_member_ledger_roundtrip() {
    let (_pool, ledgers) = setup().await;
    let angga = ledgers.members.insert_member(member("M001", "angga")).await.unwrap();

    let found = ledgers.members.find_member(angga.member_id).await.unwrap();
    assert_eq!(found, Some(angga.clone()));
    let by_name = ledgers.members.find_member_by_name("angga").await.unwrap();
    assert_eq!(by_name.map(|m| m.member_id), Some(angga.member_id));

    let duplicate = ledgers.members.insert_member(member("M002", "angga")).await;
    assert!(matches!(duplicate, Err(LedgerError::DuplicateKey(c)) if c == "members_name_key"));

    // タイムスタンプはマイクロ秒精度で保存されるため秒単位の値を使う
    let until = Utc.with_ymd_and_hms(2024, 1, 13, 10, 0, 0).unwrap();
    let updated = ledgers
        .members
        .update_member_penalty(angga.member_id, until)
        .await
        .unwrap();
    assert_eq!(updated.penalty_until, Some(until));

    let missing = ledgers
        .members
        .update_member_penalty(Member::new("x".into(), "y".into(), "z".into()).member_id, until)
        .await;
    assert!(matches!(missing, Err(LedgerError::StaleWrite)));
}

// ============================================================================
// 蔵書台帳
// ============================================================================

#[tokio::test]
#[ignore]
#[serial]
async fn test_book_ledger_listing_and_updates() {
    let (_pool, ledgers) = setup().await;
    for (code, stock) in [("C-3", 1), ("A-1", 0), ("B-2", 4)] {
        ledgers.books.insert_book(book(code, stock)).await.unwrap();
    }

    let request = PageRequest::new(Some(1), Some(2), BookSortField::Stock, SortOrder::Desc);
    let page = ledgers.books.list_books(&request).await.unwrap();
    let codes: Vec<_> = page.iter().map(|b| b.code.as_str()).collect();
    assert_eq!(codes, vec!["B-2", "C-3"]);
    assert_eq!(ledgers.books.count_books().await.unwrap(), 3);

    let a1 = ledgers.books.find_book_by_code("A-1").await.unwrap().unwrap();
    let restocked = ledgers
        .books
        .update_stock(a1.book_id, Stock::try_from(2).unwrap())
        .await
        .unwrap();
    assert_eq!(restocked.map(|b| b.stock.value()), Some(2));

    let renamed = ledgers
        .books
        .update_book(Book {
            code: "B-2".to_string(),
            ..a1.clone()
        })
        .await;
    assert!(matches!(renamed, Err(LedgerError::DuplicateKey(_))));

    assert!(ledgers.books.delete_book(a1.book_id).await.unwrap());
    assert!(!ledgers.books.delete_book(a1.book_id).await.unwrap());
}

// ============================================================================
// 貸出台帳
// ============================================================================

#[tokio::test]
#[ignore]
#[serial]
async fn test_loan_ledger_enforces_invariants() {
    let (_pool, ledgers) = setup().await;
    let angga = ledgers.members.insert_member(member("M001", "angga")).await.unwrap();
    let ferry = ledgers.members.insert_member(member("M002", "ferry")).await.unwrap();
    let books: Vec<Book> = {
        let mut books = Vec::new();
        for code in ["A-1", "B-2", "C-3"] {
            books.push(ledgers.books.insert_book(book(code, 1)).await.unwrap());
        }
        books
    };
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();

    let (first, _) = borrow_book(books[0].book_id, angga.member_id, t0);
    ledgers.loans.insert_loan(first.clone()).await.unwrap();

    // 書籍ごとの貸出中は1件まで
    let (dup, _) = borrow_book(books[0].book_id, ferry.member_id, t0);
    let result = ledgers.loans.insert_loan(dup).await;
    assert!(matches!(result, Err(LedgerError::BookAlreadyOnLoan)));

    // 会員ごとの貸出中は2件まで
    let (second, _) = borrow_book(books[1].book_id, angga.member_id, t0);
    ledgers.loans.insert_loan(second).await.unwrap();
    let (third, _) = borrow_book(books[2].book_id, angga.member_id, t0);
    let result = ledgers.loans.insert_loan(third).await;
    assert!(matches!(result, Err(LedgerError::LoanLimitReached)));

    assert_eq!(ledgers.loans.count_active_loans(angga.member_id).await.unwrap(), 2);
    let active = ledgers
        .loans
        .find_active_loan(angga.member_id, books[0].book_id)
        .await
        .unwrap();
    assert_eq!(active, Some(first.clone()));

    // 条件付き更新：2回目の返却はStaleWrite
    let returned_at = t0 + Duration::days(3);
    let returned = ledgers
        .loans
        .update_loan_as_returned(first.loan_id, returned_at, None)
        .await
        .unwrap();
    assert_eq!(returned.returned_at, returned_at);
    let again = ledgers
        .loans
        .update_loan_as_returned(first.loan_id, returned_at, None)
        .await;
    assert!(matches!(again, Err(LedgerError::StaleWrite)));

    let loans = ledgers.loans.list_loans().await.unwrap();
    assert_eq!(loans.len(), 2);
    assert!(loans.iter().any(|l| matches!(l, Loan::Returned(r) if r.loan_id == first.loan_id)));
    assert!(ledgers.loans.has_loan_history(books[0].book_id).await.unwrap());
    assert!(!ledgers.loans.has_loan_history(books[2].book_id).await.unwrap());

    // 貸出履歴のある書籍は外部キーで削除が拒否される
    let result = ledgers.books.delete_book(books[0].book_id).await;
    assert!(matches!(result, Err(LedgerError::StillReferenced)));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_return_and_penalty_are_one_transaction() {
    let (_pool, ledgers) = setup().await;
    let angga = ledgers.members.insert_member(member("M001", "angga")).await.unwrap();
    let target = ledgers.books.insert_book(book("HOB-83", 1)).await.unwrap();
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let returned_at = t0 + Duration::days(9);
    let until = returned_at + Duration::days(3);

    let (loan, _) = borrow_book(target.book_id, angga.member_id, t0);
    ledgers.loans.insert_loan(loan.clone()).await.unwrap();
    ledgers
        .loans
        .update_loan_as_returned(loan.loan_id, returned_at, Some(until))
        .await
        .unwrap();

    let stored = ledgers.members.find_member(angga.member_id).await.unwrap().unwrap();
    assert_eq!(stored.penalty_until, Some(until));
    assert_eq!(ledgers.loans.count_active_loans(angga.member_id).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
#[serial]
async fn test_concurrent_borrows_against_postgres() {
    let (pool, ledgers) = setup().await;
    let target = ledgers.books.insert_book(book("HOB-83", 3)).await.unwrap();
    let mut members = Vec::new();
    for i in 0..6 {
        let m = member(&format!("M{:03}", i), &format!("member-{}", i));
        members.push(ledgers.members.insert_member(m).await.unwrap().member_id);
    }
    let deps = Arc::new(postgres_deps(&pool));

    let handles: Vec<_> = members
        .into_iter()
        .map(|member_id| {
            let deps = deps.clone();
            tokio::spawn(async move {
                loan::borrow_book(
                    &deps,
                    BorrowBook {
                        member_id,
                        book_id: target.book_id,
                        borrowed_at: Utc::now(),
                    },
                )
                .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert!(matches!(err, LoanApplicationError::BookUnavailable)),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_late_return_penalizes_member_in_postgres() {
    let (pool, ledgers) = setup().await;
    let angga = ledgers.members.insert_member(member("M001", "angga")).await.unwrap();
    let target = ledgers.books.insert_book(book("HOB-83", 1)).await.unwrap();
    let deps = postgres_deps(&pool);
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let returned_at = t0 + Duration::days(9);

    loan::borrow_book(
        &deps,
        BorrowBook {
            member_id: angga.member_id,
            book_id: target.book_id,
            borrowed_at: t0,
        },
    )
    .await
    .unwrap();
    let receipt = loan::return_book(
        &deps,
        ReturnBook {
            member_id: angga.member_id,
            book_id: target.book_id,
            returned_at,
        },
    )
    .await
    .unwrap();

    assert_eq!(receipt.elapsed_days, 9);
    let stored = ledgers.members.find_member(angga.member_id).await.unwrap().unwrap();
    assert_eq!(stored.penalty_until, Some(returned_at + Duration::days(3)));
}
