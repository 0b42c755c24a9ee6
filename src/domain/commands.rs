use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, MemberId};

/// コマンド：書籍を借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub member_id: MemberId,
    pub book_id: BookId,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
///
/// 貸出IDではなく（会員, 書籍）の組で貸出中の貸出を特定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub member_id: MemberId,
    pub book_id: BookId,
    pub returned_at: DateTime<Utc>,
}
