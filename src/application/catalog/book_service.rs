use crate::application::ServiceDependencies;
use crate::domain::{Book, BookId, Stock};
use crate::ports::{BookSortField, Page, PageRequest, Pagination};

use super::errors::{CatalogError, Result};

/// 書籍の入力値
///
/// 在庫数は検証前の値を受け取り、`Stock` への変換で負数を拒否する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: i64,
}

fn required(field: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(CatalogError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(value)
}

fn validate(input: BookInput) -> Result<(String, String, String, Stock)> {
    Ok((
        required("code", input.code)?,
        required("title", input.title)?,
        required("author", input.author)?,
        Stock::try_from(input.stock)?,
    ))
}

/// 書籍を登録する
///
/// ビジネスルール：
/// - コードは一意（重複時はConflict）
/// - 在庫数は0以上
pub async fn create_book(deps: &ServiceDependencies, input: BookInput) -> Result<Book> {
    let (code, title, author, stock) = validate(input)?;
    let book = deps
        .book_ledger
        .insert_book(Book::new(code, title, author, stock))
        .await?;

    tracing::info!(book_id = %book.book_id.value(), code = %book.code, "book created");
    Ok(book)
}

/// コードで書籍を取得する
pub async fn get_book_by_code(deps: &ServiceDependencies, code: &str) -> Result<Book> {
    deps.book_ledger
        .find_book_by_code(code)
        .await?
        .ok_or(CatalogError::BookNotFound)
}

/// 書籍一覧（ページング）
pub async fn list_books(
    deps: &ServiceDependencies,
    request: PageRequest<BookSortField>,
) -> Result<Page<Book>> {
    let (items, total) = futures::try_join!(
        deps.book_ledger.list_books(&request),
        deps.book_ledger.count_books(),
    )?;

    Ok(Page {
        items,
        pagination: Pagination::new(&request, total),
    })
}

/// 書籍情報を更新する
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    input: BookInput,
) -> Result<Book> {
    let (code, title, author, stock) = validate(input)?;
    let book = Book {
        book_id,
        code,
        title,
        author,
        stock,
    };

    let book = deps
        .book_ledger
        .update_book(book)
        .await?
        .ok_or(CatalogError::BookNotFound)?;

    tracing::info!(book_id = %book.book_id.value(), "book updated");
    Ok(book)
}

/// 総在庫数を更新する
///
/// 貸出中の冊数より小さい値も受け付ける（利用可能数は0で下げ止まる）。
pub async fn update_stock(deps: &ServiceDependencies, book_id: BookId, stock: i64) -> Result<Book> {
    let stock = Stock::try_from(stock)?;
    let book = deps
        .book_ledger
        .update_stock(book_id, stock)
        .await?
        .ok_or(CatalogError::BookNotFound)?;

    tracing::info!(book_id = %book.book_id.value(), stock = stock.value(), "stock updated");
    Ok(book)
}

/// 書籍を削除する
///
/// 貸出中または貸出履歴のある書籍は削除できない。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let in_use = deps.loan_ledger.has_loan_history(book_id).await?;
    if in_use {
        return Err(CatalogError::BookInUse);
    }

    // 判定後に貸出が記録された場合は台帳の参照制約が拒否する
    if !deps.book_ledger.delete_book(book_id).await? {
        return Err(CatalogError::BookNotFound);
    }

    tracing::info!(book_id = %book_id.value(), "book deleted");
    Ok(())
}
