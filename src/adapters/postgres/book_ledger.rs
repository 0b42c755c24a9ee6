use crate::domain::{Book, BookId, Stock};
use crate::ports::book_ledger::BookLedger as BookLedgerTrait;
use crate::ports::{BookSortField, PageRequest, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::invalid_row;

const BOOK_COLUMNS: &str = "id, code, title, author, stock";

/// PostgreSQLの行データをBookに変換する
///
/// stockはINTEGERで保持しているため、負の値が入っていればエラーにする。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let stock: i32 = row.get("stock");
    let stock = Stock::try_from(stock).map_err(invalid_row)?;

    Ok(Book {
        book_id: BookId::from_uuid(row.get("id")),
        code: row.get("code"),
        title: row.get("title"),
        author: row.get("author"),
        stock,
    })
}

/// BookLedgerのPostgreSQL実装
pub struct BookLedger {
    pool: PgPool,
}

impl BookLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookLedgerTrait for BookLedger {
    async fn insert_book(&self, book: Book) -> Result<Book> {
        sqlx::query(
            r#"
            INSERT INTO books (id, code, title, author, stock)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.code)
        .bind(&book.title)
        .bind(&book.author)
        .bind(i32::from(book.stock))
        .execute(&self.pool)
        .await?;

        Ok(book)
    }

    async fn find_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_book_by_code(&self, code: &str) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {} FROM books WHERE code = $1", BOOK_COLUMNS))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    /// 並び替え列は列挙で固定した列名のみを埋め込む
    async fn list_books(&self, request: &PageRequest<BookSortField>) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {} FROM books ORDER BY {} {}, code ASC LIMIT $1 OFFSET $2",
            BOOK_COLUMNS,
            request.sort_by.column(),
            request.order.as_sql(),
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(request.limit()))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn list_all_books(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!("SELECT {} FROM books ORDER BY code ASC", BOOK_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn count_books(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn update_book(&self, book: Book) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE books
            SET code = $2, title = $3, author = $4, stock = $5
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.book_id.value())
        .bind(&book.code)
        .bind(&book.title)
        .bind(&book.author)
        .bind(i32::from(book.stock))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn update_stock(&self, book_id: BookId, stock: Stock) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "UPDATE books SET stock = $2 WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(book_id.value())
        .bind(i32::from(stock))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    /// 貸出から参照されている場合は外部キー違反になる
    async fn delete_book(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
