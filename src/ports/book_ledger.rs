use async_trait::async_trait;

use super::{BookSortField, PageRequest, Result};
use crate::domain::{Book, BookId, Stock};

/// 蔵書台帳ポート
#[async_trait]
pub trait BookLedger: Send + Sync {
    /// 書籍を登録する（コード重複時は `LedgerError::DuplicateKey`）
    async fn insert_book(&self, book: Book) -> Result<Book>;

    async fn find_book(&self, book_id: BookId) -> Result<Option<Book>>;

    async fn find_book_by_code(&self, code: &str) -> Result<Option<Book>>;

    /// ページ単位で取得する
    async fn list_books(&self, request: &PageRequest<BookSortField>) -> Result<Vec<Book>>;

    /// 全件をコード順で取得する
    async fn list_all_books(&self) -> Result<Vec<Book>>;

    async fn count_books(&self) -> Result<u64>;

    /// 書籍情報を更新する。存在しない場合は `None`。
    async fn update_book(&self, book: Book) -> Result<Option<Book>>;

    /// 総在庫数のみを更新する。存在しない場合は `None`。
    async fn update_stock(&self, book_id: BookId, stock: Stock) -> Result<Option<Book>>;

    /// 削除する。削除した場合は `true`。
    ///
    /// 貸出から参照されている場合は `LedgerError::StillReferenced`。
    async fn delete_book(&self, book_id: BookId) -> Result<bool>;
}
