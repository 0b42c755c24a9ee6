use crate::application::catalog;
use crate::domain::value_objects::BookId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    types::{ApiResponse, BookListQuery, BookRequest, BookResponse, StockRequest},
};

/// GET /books - 書籍一覧（ページング・並び替え）
///
/// クエリパラメータ: page, limit, sort_by（code/title/author/stock）, order（asc/desc）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<ApiResponse<Vec<BookResponse>>>, ApiError> {
    let page = catalog::list_books(&state.service_deps, query.to_request()).await?;

    Ok(Json(
        ApiResponse::new(
            StatusCode::OK,
            page.items.into_iter().map(Into::into).collect(),
            "Get books data success",
        )
        .with_pagination(page.pagination),
    ))
}

/// POST /books - 書籍を登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookResponse>>), ApiError> {
    let book = catalog::create_book(&state.service_deps, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED,
            book.into(),
            "Book created successfully",
        )),
    ))
}

/// GET /books/detail/:code - コードで書籍を取得
pub async fn get_book_detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let book = catalog::get_book_by_code(&state.service_deps, &code).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        book.into(),
        "Get book detail success",
    )))
}

/// PUT /books/:id - 書籍情報を更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<BookRequest>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let book =
        catalog::update_book(&state.service_deps, BookId::from_uuid(book_id), req.into()).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        book.into(),
        "Book updated successfully",
    )))
}

/// PATCH /books/:id - 総在庫数のみを更新
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<StockRequest>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let book =
        catalog::update_stock(&state.service_deps, BookId::from_uuid(book_id), req.stock).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        book.into(),
        "Stock updated successfully",
    )))
}

/// DELETE /books/:id - 書籍を削除
///
/// 貸出中または貸出履歴のある書籍は削除できない（409）。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Option<()>>>, ApiError> {
    catalog::delete_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        None,
        "Book deleted successfully",
    )))
}
