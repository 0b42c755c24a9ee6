use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemberSortField, PageRequest, Result};
use crate::domain::{Member, MemberId};

/// 会員台帳ポート
#[async_trait]
pub trait MemberLedger: Send + Sync {
    /// 会員を登録する（コード・名前の重複時は `LedgerError::DuplicateKey`）
    async fn insert_member(&self, member: Member) -> Result<Member>;

    async fn find_member(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// ログイン名で検索する
    async fn find_member_by_name(&self, name: &str) -> Result<Option<Member>>;

    async fn list_members(&self, request: &PageRequest<MemberSortField>) -> Result<Vec<Member>>;

    /// 全件をコード順で取得する
    async fn list_all_members(&self) -> Result<Vec<Member>>;

    async fn count_members(&self) -> Result<u64>;

    /// ペナルティ期限を上書きする
    ///
    /// 既存の期限より前の値でも上書きする。会員が存在しない場合は `LedgerError::StaleWrite`。
    async fn update_member_penalty(
        &self,
        member_id: MemberId,
        penalty_until: DateTime<Utc>,
    ) -> Result<Member>;
}
