use thiserror::Error;

use crate::application::ErrorKind;
use crate::domain::StockError;
use crate::ports::LedgerError;

/// 蔵書管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 書籍コードが重複している
    #[error("Book code already exists")]
    DuplicateCode,

    /// 貸出中または貸出履歴があるため削除できない
    #[error("Book is referenced by loans")]
    BookInUse,

    /// 在庫数が不正
    #[error("Invalid stock: {0}")]
    InvalidStock(#[from] StockError),

    /// 入力が不正
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 台帳に到達できない
    #[error("Ledger unavailable")]
    Unavailable(#[source] LedgerError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::BookNotFound => ErrorKind::NotFound,
            CatalogError::DuplicateCode | CatalogError::BookInUse => ErrorKind::Conflict,
            CatalogError::InvalidStock(_) | CatalogError::InvalidInput(_) => ErrorKind::Invalid,
            CatalogError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::BookNotFound => "BOOK_NOT_FOUND",
            CatalogError::DuplicateCode => "DUPLICATE_CODE",
            CatalogError::BookInUse => "BOOK_IN_USE",
            CatalogError::InvalidStock(_) => "INVALID_STOCK",
            CatalogError::InvalidInput(_) => "INVALID_INPUT",
            CatalogError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<LedgerError> for CatalogError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateKey(_) => CatalogError::DuplicateCode,
            LedgerError::StillReferenced => CatalogError::BookInUse,
            other => CatalogError::Unavailable(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
