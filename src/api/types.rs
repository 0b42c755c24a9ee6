use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::catalog::BookInput;
use crate::application::loan::{LoanDetails, ReturnReceipt};
use crate::application::membership::{LoginSession, Registration, TokenPair};
use crate::domain::loan::{ActiveLoan, Loan};
use crate::domain::{Book, BookAvailability, Member, MemberLoanSummary};
use crate::ports::{BookSortField, MemberSortField, PageRequest, Pagination, SortOrder};

// ============================================================================
// Envelope
// ============================================================================

/// 成功レスポンスの共通形式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub status_code: u16,
    pub data: T,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status: "success",
            status_code: status.as_u16(),
            data,
            message: message.into(),
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Query parameters
// ============================================================================

/// 書籍一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct BookListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(alias = "sortby")]
    pub sort_by: Option<BookSortField>,
    #[serde(alias = "sort")]
    pub order: Option<SortOrder>,
}

impl BookListQuery {
    pub fn to_request(&self) -> PageRequest<BookSortField> {
        PageRequest::new(
            self.page,
            self.limit,
            self.sort_by.unwrap_or_default(),
            self.order.unwrap_or_default(),
        )
    }
}

/// 会員一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(alias = "sortby")]
    pub sort_by: Option<MemberSortField>,
    #[serde(alias = "sort")]
    pub order: Option<SortOrder>,
}

impl MemberListQuery {
    pub fn to_request(&self) -> PageRequest<MemberSortField> {
        PageRequest::new(
            self.page,
            self.limit,
            self.sort_by.unwrap_or_default(),
            self.order.unwrap_or_default(),
        )
    }
}

// ============================================================================
// Requests
// ============================================================================

/// 貸出・返却リクエスト（会員IDはトークンから取得する）
#[derive(Debug, Deserialize)]
pub struct LoanRequest {
    pub book_id: Uuid,
}

/// 書籍の登録・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: i64,
}

impl From<BookRequest> for BookInput {
    fn from(req: BookRequest) -> Self {
        Self {
            code: req.code,
            title: req.title,
            author: req.author,
            stock: req.stock,
        }
    }
}

/// 在庫数更新リクエスト
#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub stock: i64,
}

/// 会員登録リクエスト
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub code: String,
    pub name: String,
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            password: req.password,
        }
    }
}

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// トークン再発行リクエスト
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: u32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            code: book.code,
            title: book.title,
            author: book.author,
            stock: book.stock.value(),
        }
    }
}

/// 書籍の貸出状況レスポンス（GET /loans/check-books）
#[derive(Debug, Serialize)]
pub struct BookAvailabilityResponse {
    #[serde(flatten)]
    pub book: BookResponse,
    pub active_loans: usize,
    pub available_stock: u32,
}

impl From<BookAvailability> for BookAvailabilityResponse {
    fn from(view: BookAvailability) -> Self {
        let available_stock = view.available_stock();
        Self {
            book: view.book.into(),
            active_loans: view.active_loans,
            available_stock,
        }
    }
}

/// 会員レスポンス（パスワードハッシュは含めない）
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub penalty_until: Option<DateTime<Utc>>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.member_id.value(),
            code: member.code,
            name: member.name,
            penalty_until: member.penalty_until,
        }
    }
}

/// 会員の貸出状況レスポンス（GET /loans/check-members, プロフィール）
#[derive(Debug, Serialize)]
pub struct MemberLoansResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub active_loans: usize,
}

impl From<MemberLoanSummary> for MemberLoansResponse {
    fn from(summary: MemberLoanSummary) -> Self {
        Self {
            member: summary.member.into(),
            active_loans: summary.active_loans,
        }
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: Uuid,
    pub member_id: Uuid,
    pub book_id: Uuid,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        let core = loan.core();
        Self {
            id: core.loan_id.value(),
            member_id: core.member_id.value(),
            book_id: core.book_id.value(),
            loan_date: core.loaned_at,
            return_date: loan.returned_at(),
            is_returned: loan.is_returned(),
        }
    }
}

impl From<ActiveLoan> for LoanResponse {
    fn from(loan: ActiveLoan) -> Self {
        Loan::Active(loan).into()
    }
}

/// 貸出詳細レスポンス（GET /loans/all）
#[derive(Debug, Serialize)]
pub struct LoanDetailsResponse {
    #[serde(flatten)]
    pub loan: LoanResponse,
    pub member_name: Option<String>,
    pub book_code: Option<String>,
    pub book_title: Option<String>,
}

impl From<LoanDetails> for LoanDetailsResponse {
    fn from(details: LoanDetails) -> Self {
        Self {
            loan: details.loan.into(),
            member_name: details.member_name,
            book_code: details.book_code,
            book_title: details.book_title,
        }
    }
}

/// 返却レスポンス
#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    #[serde(flatten)]
    pub loan: LoanResponse,
    pub elapsed_days: i64,
    pub penalty_until: Option<DateTime<Utc>>,
}

impl From<ReturnReceipt> for ReturnResponse {
    fn from(receipt: ReturnReceipt) -> Self {
        Self {
            loan: Loan::Returned(receipt.loan).into(),
            elapsed_days: receipt.elapsed_days,
            penalty_until: receipt.penalty_until,
        }
    }
}

/// トークンの組
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            token: pair.access.token,
            token_expires_at: pair.access.expires_at,
            refresh_token: pair.refresh.token,
            refresh_token_expires_at: pair.refresh.expires_at,
        }
    }
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

impl From<LoginSession> for LoginResponse {
    fn from(session: LoginSession) -> Self {
        Self {
            member: session.member.into(),
            tokens: session.tokens.into(),
        }
    }
}
