use crate::application::ServiceDependencies;
use crate::domain::{Member, MemberId, MemberLoanSummary};
use crate::ports::{CredentialError, IssuedToken, MemberSortField, Page, PageRequest, Pagination, TokenKind};

use super::errors::{MembershipError, Result};

/// 会員登録の入力値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub code: String,
    pub name: String,
    pub password: String,
}

/// アクセストークンとリフレッシュトークンの組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// ログイン結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub member: Member,
    pub tokens: TokenPair,
}

fn issue_pair(deps: &ServiceDependencies, member: &Member) -> Result<TokenPair> {
    Ok(TokenPair {
        access: deps.token_issuer.issue(member, TokenKind::Access)?,
        refresh: deps.token_issuer.issue(member, TokenKind::Refresh)?,
    })
}

/// 会員を登録する
///
/// ビジネスルール：
/// - 名前・コードは一意
/// - パスワードはハッシュ化して保存
/// - ペナルティなしで登録
pub async fn register_member(deps: &ServiceDependencies, input: Registration) -> Result<Member> {
    let code = input.code.trim().to_string();
    let name = input.name.trim().to_string();
    if code.is_empty() || name.is_empty() {
        return Err(MembershipError::InvalidInput(
            "code and name must not be empty".to_string(),
        ));
    }
    if input.password.is_empty() {
        return Err(MembershipError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }

    let password_hash = deps.password_hasher.hash(&input.password)?;
    let member = deps
        .member_ledger
        .insert_member(Member::new(code, name, password_hash))
        .await?;

    tracing::info!(member_id = %member.member_id.value(), name = %member.name, "member registered");
    Ok(member)
}

/// ログインする
///
/// 名前が存在しない場合とパスワードが違う場合は同じエラーを返す。
pub async fn login(deps: &ServiceDependencies, name: &str, password: &str) -> Result<LoginSession> {
    let Some(member) = deps.member_ledger.find_member_by_name(name).await? else {
        tracing::debug!(name, "login with unknown name");
        return Err(MembershipError::InvalidCredentials);
    };

    // 保存済みハッシュが読めない場合も、利用者には資格情報の誤りとして返す
    let verified = deps
        .password_hasher
        .verify(password, &member.password_hash)
        .map_err(|err| match err {
            CredentialError::Invalid => {
                tracing::warn!(member_id = %member.member_id.value(), "stored password hash is unreadable");
                MembershipError::InvalidCredentials
            }
            other => MembershipError::Credential(other),
        })?;
    if !verified {
        tracing::debug!(member_id = %member.member_id.value(), "login with wrong password");
        return Err(MembershipError::InvalidCredentials);
    }

    let tokens = issue_pair(deps, &member)?;
    tracing::info!(member_id = %member.member_id.value(), "member logged in");

    Ok(LoginSession { member, tokens })
}

/// リフレッシュトークンから新しいトークンの組を発行する
///
/// アクセストークンをリフレッシュトークンとして使うことはできない。
/// 会員が削除済みの場合も不正なトークンとして扱う。
pub async fn refresh_token(deps: &ServiceDependencies, refresh_token: &str) -> Result<TokenPair> {
    let claims = deps
        .token_issuer
        .verify(refresh_token, TokenKind::Refresh)?;

    let member = deps
        .member_ledger
        .find_member(claims.member_id)
        .await?
        .ok_or(MembershipError::InvalidToken)?;

    issue_pair(deps, &member)
}

/// 会員のプロフィール（貸出中冊数つき）
pub async fn get_profile(deps: &ServiceDependencies, member_id: MemberId) -> Result<MemberLoanSummary> {
    let (member, active_loans) = futures::try_join!(
        deps.member_ledger.find_member(member_id),
        deps.loan_ledger.count_active_loans(member_id),
    )?;

    let member = member.ok_or(MembershipError::MemberNotFound)?;
    Ok(MemberLoanSummary {
        member,
        active_loans,
    })
}

/// 会員一覧（ページング）
pub async fn list_members(
    deps: &ServiceDependencies,
    request: PageRequest<MemberSortField>,
) -> Result<Page<Member>> {
    let (items, total) = futures::try_join!(
        deps.member_ledger.list_members(&request),
        deps.member_ledger.count_members(),
    )?;

    Ok(Page {
        items,
        pagination: Pagination::new(&request, total),
    })
}
