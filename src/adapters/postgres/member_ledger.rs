use crate::domain::{Member, MemberId};
use crate::ports::member_ledger::MemberLedger as MemberLedgerTrait;
use crate::ports::{LedgerError, MemberSortField, PageRequest, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

const MEMBER_COLUMNS: &str = "id, code, name, password, penalty_until";

/// PostgreSQLの行データをMemberに変換する
fn map_row_to_member(row: &PgRow) -> Member {
    Member {
        member_id: MemberId::from_uuid(row.get("id")),
        code: row.get("code"),
        name: row.get("name"),
        password_hash: row.get("password"),
        penalty_until: row.get("penalty_until"),
    }
}

/// MemberLedgerのPostgreSQL実装
pub struct MemberLedger {
    pool: PgPool,
}

impl MemberLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberLedgerTrait for MemberLedger {
    async fn insert_member(&self, member: Member) -> Result<Member> {
        sqlx::query(
            r#"
            INSERT INTO members (id, code, name, password, penalty_until)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(member.member_id.value())
        .bind(&member.code)
        .bind(&member.name)
        .bind(&member.password_hash)
        .bind(member.penalty_until)
        .execute(&self.pool)
        .await?;

        Ok(member)
    }

    async fn find_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = $1", MEMBER_COLUMNS))
            .bind(member_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    async fn find_member_by_name(&self, name: &str) -> Result<Option<Member>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM members WHERE name = $1",
            MEMBER_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    /// 並び替え列は列挙で固定した列名のみを埋め込む
    async fn list_members(&self, request: &PageRequest<MemberSortField>) -> Result<Vec<Member>> {
        let sql = format!(
            "SELECT {} FROM members ORDER BY {} {}, code ASC LIMIT $1 OFFSET $2",
            MEMBER_COLUMNS,
            request.sort_by.column(),
            request.order.as_sql(),
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(request.limit()))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row_to_member).collect())
    }

    async fn list_all_members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM members ORDER BY code ASC",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_member).collect())
    }

    async fn count_members(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn update_member_penalty(
        &self,
        member_id: MemberId,
        penalty_until: DateTime<Utc>,
    ) -> Result<Member> {
        let row = sqlx::query(&format!(
            "UPDATE members SET penalty_until = $2 WHERE id = $1 RETURNING {}",
            MEMBER_COLUMNS
        ))
        .bind(member_id.value())
        .bind(penalty_until)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(map_row_to_member)
            .ok_or(LedgerError::StaleWrite)
    }
}
