use chrono::{DateTime, Utc};

/// 貸出の拒否理由
///
/// 純粋な判定関数が返す。会員の存在確認はここに含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowRejection {
    /// ペナルティ期間中
    Penalized { until: DateTime<Utc> },
    /// 同時貸出冊数の上限に達している
    BorrowLimitReached,
    /// 貸出中、または在庫なし
    BookUnavailable,
    /// 蔵書に存在しない
    BookNotFound,
}
