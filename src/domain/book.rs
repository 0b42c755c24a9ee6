use serde::{Deserialize, Serialize};

use super::{BookId, Stock};

/// 蔵書
///
/// 総在庫数のみを保持する。利用可能数は貸出台帳から都度導出する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    /// 人が読める一意のコード（例: "HOB-83"）
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: Stock,
}

impl Book {
    pub fn new(code: String, title: String, author: String, stock: Stock) -> Self {
        Self {
            book_id: BookId::new(),
            code,
            title,
            author,
            stock,
        }
    }
}

/// 書籍の貸出可否ビュー（読み取り専用の導出値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAvailability {
    pub book: Book,
    pub active_loans: usize,
}

impl BookAvailability {
    /// 総在庫数 - 貸出中の冊数
    pub fn available_stock(&self) -> u32 {
        self.book.stock.available(self.active_loans)
    }

    /// 貸出可能か
    ///
    /// 在庫が1以上あり、かつ貸出中の貸出が存在しないこと。
    /// 貸出ガードは書籍ID単位（1冊モデル）で行う。
    pub fn is_available_to_borrow(&self) -> bool {
        self.book.stock.is_positive() && self.active_loans == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with_stock(stock: i64) -> Book {
        Book::new(
            "HOB-83".to_string(),
            "The Hobbit".to_string(),
            "J.R.R. Tolkien".to_string(),
            Stock::try_from(stock).unwrap(),
        )
    }

    #[test]
    fn test_available_when_stock_and_no_active_loan() {
        let view = BookAvailability {
            book: book_with_stock(1),
            active_loans: 0,
        };
        assert!(view.is_available_to_borrow());
        assert_eq!(view.available_stock(), 1);
    }

    #[test]
    fn test_unavailable_when_book_is_on_loan() {
        // 在庫が複数あっても書籍ID単位でガードする
        let view = BookAvailability {
            book: book_with_stock(3),
            active_loans: 1,
        };
        assert!(!view.is_available_to_borrow());
        assert_eq!(view.available_stock(), 2);
    }

    #[test]
    fn test_unavailable_when_stock_is_zero() {
        let view = BookAvailability {
            book: book_with_stock(0),
            active_loans: 0,
        };
        assert!(!view.is_available_to_borrow());
        assert_eq!(view.available_stock(), 0);
    }
}
