use crate::application::loan::{
    self, borrow_book as execute_borrow_book, return_book as execute_return_book,
};
use crate::domain::commands::{BorrowBook, ReturnBook};
use crate::domain::value_objects::BookId;
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use std::sync::Arc;

use super::AppState;
use crate::api::{
    auth::AuthenticatedMember,
    error::ApiError,
    types::{
        ApiResponse, BookAvailabilityResponse, LoanDetailsResponse, LoanRequest, LoanResponse,
        MemberLoansResponse, ReturnResponse,
    },
};

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /loans/borrow - 書籍を借りる
///
/// 会員IDはアクセストークンから取得する。
///
/// 強制されるビジネスルール:
/// - ペナルティ期間中でないこと
/// - 貸出中の冊数が2冊未満であること
/// - 書籍が貸出中でなく、在庫があること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Json(req): Json<LoanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoanResponse>>), ApiError> {
    let cmd = BorrowBook {
        member_id: claims.member_id,
        book_id: BookId::from_uuid(req.book_id),
        borrowed_at: Utc::now(),
    };

    let loan = execute_borrow_book(&state.service_deps, cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED,
            LoanResponse::from(loan),
            "Book borrowed successfully",
        )),
    ))
}

/// POST /loans/return - 書籍を返却する
///
/// 返却までの経過日数が7日を超えた場合、会員に3日間のペナルティが課される。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    AuthenticatedMember(claims): AuthenticatedMember,
    Json(req): Json<LoanRequest>,
) -> Result<Json<ApiResponse<ReturnResponse>>, ApiError> {
    let cmd = ReturnBook {
        member_id: claims.member_id,
        book_id: BookId::from_uuid(req.book_id),
        returned_at: Utc::now(),
    };

    let receipt = execute_return_book(&state.service_deps, cmd).await?;
    let message = match receipt.penalty_until {
        Some(_) => "Book returned late, member penalized",
        None => "Book returned successfully",
    };

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        ReturnResponse::from(receipt),
        message,
    )))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans/check-books - 貸出可能な書籍
pub async fn check_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BookAvailabilityResponse>>>, ApiError> {
    let books = loan::list_available_books(&state.service_deps).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        books.into_iter().map(Into::into).collect(),
        "Get available books success",
    )))
}

/// GET /loans/check-members - 会員ごとの貸出中冊数
pub async fn check_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MemberLoansResponse>>>, ApiError> {
    let members = loan::list_members_with_loans(&state.service_deps).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        members.into_iter().map(Into::into).collect(),
        "Get members loan status success",
    )))
}

/// GET /loans/all - 全貸出（会員名・書籍情報つき）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LoanDetailsResponse>>>, ApiError> {
    let loans = loan::list_loans_with_details(&state.service_deps).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        loans.into_iter().map(Into::into).collect(),
        "Get loans success",
    )))
}
