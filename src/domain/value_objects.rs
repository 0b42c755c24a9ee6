#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 貸出ID - 貸出台帳の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

/// 書籍ID - 蔵書台帳への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 会員ID - 会員台帳への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

/// 在庫数エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// 負の在庫数
    #[error("stock must not be negative: {0}")]
    Negative(i64),
    /// 表現可能な範囲を超えた
    #[error("stock out of range: {0}")]
    OutOfRange(i64),
}

/// 総在庫数
///
/// 不変条件：0以上。
/// データベースはINTEGERで保持するため、i32に収まる値のみ受け付ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Stock(u32);

impl Stock {
    pub const ZERO: Stock = Stock(0);

    /// 現在の値
    pub fn value(&self) -> u32 {
        self.0
    }

    /// 在庫があるか
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// 貸出中の冊数を差し引いた利用可能在庫
    ///
    /// 在庫数が貸出後に減らされた場合でも0未満にはならない。
    pub fn available(&self, active_loans: usize) -> u32 {
        let active = u32::try_from(active_loans).unwrap_or(u32::MAX);
        self.0.saturating_sub(active)
    }
}

impl TryFrom<i64> for Stock {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(StockError::Negative(value));
        }
        if value > i64::from(i32::MAX) {
            return Err(StockError::OutOfRange(value));
        }
        Ok(Self(value as u32))
    }
}

impl TryFrom<i32> for Stock {
    type Error = StockError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Stock::try_from(i64::from(value))
    }
}

impl From<Stock> for i64 {
    fn from(stock: Stock) -> Self {
        i64::from(stock.0)
    }
}

impl From<Stock> for i32 {
    fn from(stock: Stock) -> Self {
        // TryFromで i32::MAX 以下であることを保証済み
        stock.0 as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_try_from_valid() {
        let stock = Stock::try_from(3_i64);
        assert!(stock.is_ok());
        assert_eq!(stock.unwrap().value(), 3);

        let stock = Stock::try_from(0_i32).unwrap();
        assert_eq!(stock, Stock::ZERO);
        assert!(!stock.is_positive());
    }

    #[test]
    fn test_stock_try_from_negative() {
        let stock = Stock::try_from(-1_i64);
        assert_eq!(stock.unwrap_err(), StockError::Negative(-1));
    }

    #[test]
    fn test_stock_error_messages() {
        assert_eq!(
            StockError::Negative(-1).to_string(),
            "stock must not be negative: -1"
        );
        assert_eq!(StockError::OutOfRange(5).to_string(), "stock out of range: 5");
    }

    #[test]
    fn test_stock_try_from_out_of_range() {
        let too_big = i64::from(i32::MAX) + 1;
        assert_eq!(
            Stock::try_from(too_big).unwrap_err(),
            StockError::OutOfRange(too_big)
        );
    }

    #[test]
    fn test_stock_available_subtracts_active_loans() {
        let stock = Stock::try_from(2_i64).unwrap();
        assert_eq!(stock.available(0), 2);
        assert_eq!(stock.available(1), 1);
    }

    #[test]
    fn test_stock_available_never_negative() {
        // 貸出後に在庫数が0へ更新されたケース
        assert_eq!(Stock::ZERO.available(1), 0);
    }

    #[test]
    fn test_stock_serde_rejects_negative() {
        let parsed: Result<Stock, _> = serde_json::from_str("-5");
        assert!(parsed.is_err());

        let parsed: Stock = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.value(), 7);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "7");
    }

    // ID value objects のテスト
    #[test]
    fn test_loan_id_creation() {
        let id1 = LoanId::new();
        let id2 = LoanId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_loan_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = LoanId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }

    #[test]
    fn test_book_id_creation() {
        let id1 = BookId::new();
        let id2 = BookId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_member_id_creation() {
        let id1 = MemberId::new();
        let id2 = MemberId::new();
        assert_ne!(id1, id2);
    }
}
