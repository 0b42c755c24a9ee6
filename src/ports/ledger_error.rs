use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// 台帳ポートのエラー
///
/// 台帳アダプタはストレージ固有のエラーをこの型に分類して返す。
/// アプリケーション層はこの分類のみを見てドメインのエラーへ変換する。
#[derive(Debug, Error)]
pub enum LedgerError {
    /// 対象書籍には既に貸出中の貸出がある（書籍単位の一意制約）
    #[error("book already has an active loan")]
    BookAlreadyOnLoan,

    /// 会員の貸出中冊数が上限に達している
    #[error("member reached the active loan limit")]
    LoanLimitReached,

    /// 条件付き更新で対象行が見つからなかった（他の要求が先に更新した）
    #[error("row was modified concurrently")]
    StaleWrite,

    /// 一意制約違反
    #[error("duplicate key violates {0}")]
    DuplicateKey(String),

    /// 他の行から参照されているため削除できない
    #[error("row is still referenced")]
    StillReferenced,

    /// ストレージに到達できない、または予期しない失敗
    #[error("ledger unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    pub fn unavailable<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LedgerError::Unavailable(Box::new(err))
    }
}
