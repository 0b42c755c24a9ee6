/// アプリケーション層エラーの分類
///
/// 各サービスのエラーはこの分類を報告し、トランスポート層は分類のみを見て
/// ステータスコードを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Invalid,
    Unauthorized,
    Unavailable,
}
