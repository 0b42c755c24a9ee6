use crate::application::membership;
use crate::domain::value_objects::MemberId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    auth::AuthenticatedMember,
    error::ApiError,
    types::{
        ApiResponse, LoginRequest, LoginResponse, MemberListQuery, MemberLoansResponse,
        MemberResponse, RefreshRequest, RegisterRequest, TokenResponse,
    },
};

/// GET /members - 会員一覧（ページング・並び替え）
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MemberListQuery>,
) -> Result<Json<ApiResponse<Vec<MemberResponse>>>, ApiError> {
    let page = membership::list_members(&state.service_deps, query.to_request()).await?;

    Ok(Json(
        ApiResponse::new(
            StatusCode::OK,
            page.items.into_iter().map(Into::into).collect(),
            "Get members data success",
        )
        .with_pagination(page.pagination),
    ))
}

/// POST /members/register - 会員登録
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberResponse>>), ApiError> {
    let member = membership::register_member(&state.service_deps, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED,
            member.into(),
            "Member created successfully",
        )),
    ))
}

/// POST /members/login - ログイン
///
/// アクセストークン（1時間）とリフレッシュトークン（3時間）を返す。
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let session = membership::login(&state.service_deps, &req.name, &req.password).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        session.into(),
        "Login successful",
    )))
}

/// POST /members/refresh-token - トークン再発行
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let tokens = membership::refresh_token(&state.service_deps, &req.refresh_token).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        tokens.into(),
        "Token has been refreshed",
    )))
}

/// GET /members/profile/:id - 会員プロフィール（要認証）
pub async fn profile(
    State(state): State<Arc<AppState>>,
    _member: AuthenticatedMember,
    Path(member_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MemberLoansResponse>>, ApiError> {
    let summary =
        membership::get_profile(&state.service_deps, MemberId::from_uuid(member_id)).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK,
        summary.into(),
        "Get profile data success",
    )))
}
