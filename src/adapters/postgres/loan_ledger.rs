use crate::domain::loan::{ActiveLoan, Loan, LoanCore, MAX_ACTIVE_LOANS, ReturnedLoan};
use crate::domain::value_objects::{BookId, LoanId, MemberId};
use crate::ports::loan_ledger::LoanLedger as LoanLedgerTrait;
use crate::ports::{LedgerError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

const LOAN_COLUMNS: &str = "id, member_id, book_id, loan_date, return_date, is_returned";

/// 書籍ごとの貸出中を1件に制限する部分一意インデックス
const ACTIVE_BOOK_CONSTRAINT: &str = "loans_active_book_key";

fn map_row_to_core(row: &PgRow) -> LoanCore {
    LoanCore {
        loan_id: LoanId::from_uuid(row.get("id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        loaned_at: row.get("loan_date"),
    }
}

/// PostgreSQLの行データをLoanに変換する
///
/// is_returned と return_date の整合性はテーブルのCHECK制約で保証している。
fn map_row_to_loan(row: &PgRow) -> Loan {
    let core = map_row_to_core(row);
    let is_returned: bool = row.get("is_returned");
    let returned_at: Option<DateTime<Utc>> = row.get("return_date");

    match returned_at.filter(|_| is_returned) {
        Some(returned_at) => Loan::Returned(ReturnedLoan { core, returned_at }),
        None => Loan::Active(ActiveLoan { core }),
    }
}

fn map_row_to_active_loan(row: &PgRow) -> ActiveLoan {
    ActiveLoan {
        core: map_row_to_core(row),
    }
}

/// LoanLedgerのPostgreSQL実装
pub struct LoanLedger {
    pool: PgPool,
}

impl LoanLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanLedgerTrait for LoanLedger {
    /// 会員の貸出中の冊数（部分インデックス loans_active_member_idx を使用）
    async fn count_active_loans(&self, member_id: MemberId) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND is_returned = FALSE",
        )
        .bind(member_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }

    async fn find_active_loan_by_book(&self, book_id: BookId) -> Result<Option<ActiveLoan>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM loans WHERE book_id = $1 AND is_returned = FALSE",
            LOAN_COLUMNS
        ))
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_active_loan))
    }

    async fn find_active_loan(
        &self,
        member_id: MemberId,
        book_id: BookId,
    ) -> Result<Option<ActiveLoan>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM loans
            WHERE member_id = $1 AND book_id = $2 AND is_returned = FALSE
            "#,
            LOAN_COLUMNS
        ))
        .bind(member_id.value())
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_active_loan))
    }

    /// 貸出を記録する
    ///
    /// 1. 会員行を FOR UPDATE でロックし、同じ会員の貸出記録を直列化する
    /// 2. ロック下で貸出中の冊数を数え直す
    /// 3. INSERT（書籍の重複は部分一意インデックスが拒否する）
    async fn insert_loan(&self, loan: ActiveLoan) -> Result<ActiveLoan> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM members WHERE id = $1 FOR UPDATE")
            .bind(loan.member_id.value())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(LedgerError::StaleWrite);
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND is_returned = FALSE",
        )
        .bind(loan.member_id.value())
        .fetch_one(&mut *tx)
        .await?;
        if active as usize >= MAX_ACTIVE_LOANS {
            return Err(LedgerError::LoanLimitReached);
        }

        sqlx::query(
            r#"
            INSERT INTO loans (id, member_id, book_id, loan_date, return_date, is_returned)
            VALUES ($1, $2, $3, $4, NULL, FALSE)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.member_id.value())
        .bind(loan.book_id.value())
        .bind(loan.loaned_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| match LedgerError::from(err) {
            LedgerError::DuplicateKey(constraint) if constraint == ACTIVE_BOOK_CONSTRAINT => {
                LedgerError::BookAlreadyOnLoan
            }
            // 判定後に書籍が削除された
            LedgerError::StillReferenced => LedgerError::StaleWrite,
            other => other,
        })?;

        tx.commit().await?;

        Ok(loan)
    }

    /// 貸出中である場合のみ返却済みにする（条件付き更新）
    ///
    /// ペナルティ期限の更新も同じトランザクションで行う。
    async fn update_loan_as_returned(
        &self,
        loan_id: LoanId,
        returned_at: DateTime<Utc>,
        penalty_until: Option<DateTime<Utc>>,
    ) -> Result<ReturnedLoan> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE loans
            SET is_returned = TRUE, return_date = $2
            WHERE id = $1 AND is_returned = FALSE
            RETURNING {}
            "#,
            LOAN_COLUMNS
        ))
        .bind(loan_id.value())
        .bind(returned_at)
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or(LedgerError::StaleWrite)?;
        let returned = ReturnedLoan {
            core: map_row_to_core(&row),
            returned_at: row.get("return_date"),
        };

        if let Some(until) = penalty_until {
            let result = sqlx::query("UPDATE members SET penalty_until = $2 WHERE id = $1")
                .bind(returned.member_id.value())
                .bind(until)
                .execute(&mut *tx)
                .await?;
            // ロールバックはトランザクションのドロップで行われる
            if result.rows_affected() == 0 {
                return Err(LedgerError::StaleWrite);
            }
        }

        tx.commit().await?;

        Ok(returned)
    }

    async fn list_active_loans(&self) -> Result<Vec<ActiveLoan>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM loans WHERE is_returned = FALSE ORDER BY loan_date ASC",
            LOAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_active_loan).collect())
    }

    async fn list_loans(&self) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM loans ORDER BY loan_date DESC",
            LOAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }

    async fn has_loan_history(&self, book_id: BookId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM loans WHERE book_id = $1)")
                .bind(book_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
