//! 즐겨찾기 서브레딧 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/subreddits` - 활성 서브레딧 목록
//! - `POST /api/v1/subreddits` - 서브레딧 추가
//! - `PUT /api/v1/subreddits/{id}` - 이름 변경
//! - `PATCH /api/v1/subreddits/{id}/toggle` - 활성 상태 토글
//! - `DELETE /api/v1/subreddits/{id}` - 삭제
//!
//! 이름은 공백 제거/소문자화/`r/` 접두사 제거로 정규화되며,
//! 중복 이름은 409를 반환합니다.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{
    db_error, db_not_configured, invalid_input, not_found, ApiErrorResponse, ApiResult,
};
use crate::repository::{
    is_unique_violation, normalize_subreddit_name, SubredditRecord, SubredditRepository,
};
use crate::state::AppState;

/// 서브레딧 추가/변경 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubredditNameRequest {
    /// 서브레딧 이름 (예: "wallstreetbets", "r/stocks")
    pub name: Option<String>,
}

/// 삭제 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteSubredditResponse {
    pub success: bool,
}

/// 요청에서 정규화된 이름을 꺼냅니다.
fn normalized_name(request: &SubredditNameRequest) -> ApiResult<String> {
    let raw = request
        .name
        .as_deref()
        .ok_or_else(|| invalid_input("서브레딧 이름이 필요합니다"))?;

    normalize_subreddit_name(raw)
        .ok_or_else(|| invalid_input("유효하지 않은 서브레딧 이름입니다"))
}

/// 고유 제약 위반을 409로 변환합니다.
fn map_insert_error(err: sqlx::Error) -> (StatusCode, Json<ApiErrorResponse>) {
    if is_unique_violation(&err) {
        (
            StatusCode::CONFLICT,
            Json(ApiErrorResponse::new(
                "DUPLICATE",
                "이미 존재하는 서브레딧입니다",
            )),
        )
    } else {
        db_error(err)
    }
}

/// 활성 서브레딧 목록 조회.
///
/// GET /api/v1/subreddits
#[utoipa::path(
    get,
    path = "/api/v1/subreddits",
    responses((status = 200, description = "활성 서브레딧 목록", body = [SubredditRecord])),
    tag = "subreddits"
)]
pub async fn list_subreddits(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SubredditRecord>>> {
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let subreddits = SubredditRepository::list_active(pool)
        .await
        .map_err(db_error)?;

    Ok(Json(subreddits))
}

/// 서브레딧 추가.
///
/// POST /api/v1/subreddits
#[utoipa::path(
    post,
    path = "/api/v1/subreddits",
    request_body = SubredditNameRequest,
    responses(
        (status = 200, description = "추가된 서브레딧", body = SubredditRecord),
        (status = 400, description = "이름 누락/무효", body = ApiErrorResponse),
        (status = 409, description = "중복 이름", body = ApiErrorResponse)
    ),
    tag = "subreddits"
)]
pub async fn add_subreddit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubredditNameRequest>,
) -> ApiResult<Json<SubredditRecord>> {
    let name = normalized_name(&request)?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let record = SubredditRepository::insert(pool, &name)
        .await
        .map_err(map_insert_error)?;

    Ok(Json(record))
}

/// 서브레딧 이름 변경.
///
/// PUT /api/v1/subreddits/{id}
#[utoipa::path(
    put,
    path = "/api/v1/subreddits/{id}",
    params(("id" = Uuid, Path, description = "서브레딧 id")),
    request_body = SubredditNameRequest,
    responses(
        (status = 200, description = "변경된 서브레딧", body = SubredditRecord),
        (status = 404, description = "서브레딧 없음", body = ApiErrorResponse),
        (status = 409, description = "중복 이름", body = ApiErrorResponse)
    ),
    tag = "subreddits"
)]
pub async fn rename_subreddit(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubredditNameRequest>,
) -> ApiResult<Json<SubredditRecord>> {
    let name = normalized_name(&request)?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let record = SubredditRepository::rename(pool, id, &name)
        .await
        .map_err(map_insert_error)?
        .ok_or_else(|| not_found(format!("서브레딧을 찾을 수 없습니다: {}", id)))?;

    Ok(Json(record))
}

/// 서브레딧 활성 상태 토글.
///
/// PATCH /api/v1/subreddits/{id}/toggle
#[utoipa::path(
    patch,
    path = "/api/v1/subreddits/{id}/toggle",
    params(("id" = Uuid, Path, description = "서브레딧 id")),
    responses(
        (status = 200, description = "토글된 서브레딧", body = SubredditRecord),
        (status = 404, description = "서브레딧 없음", body = ApiErrorResponse)
    ),
    tag = "subreddits"
)]
pub async fn toggle_subreddit(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SubredditRecord>> {
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let record = SubredditRepository::toggle(pool, id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(format!("서브레딧을 찾을 수 없습니다: {}", id)))?;

    Ok(Json(record))
}

/// 서브레딧 삭제.
///
/// DELETE /api/v1/subreddits/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/subreddits/{id}",
    params(("id" = Uuid, Path, description = "서브레딧 id")),
    responses(
        (status = 200, description = "삭제 성공", body = DeleteSubredditResponse),
        (status = 404, description = "서브레딧 없음", body = ApiErrorResponse)
    ),
    tag = "subreddits"
)]
pub async fn delete_subreddit(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeleteSubredditResponse>> {
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let deleted = SubredditRepository::delete(pool, id)
        .await
        .map_err(db_error)?;

    if !deleted {
        return Err(not_found(format!("서브레딧을 찾을 수 없습니다: {}", id)));
    }

    Ok(Json(DeleteSubredditResponse { success: true }))
}

/// 서브레딧 라우터 생성.
pub fn subreddits_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_subreddits).post(add_subreddit))
        .route("/{id}", put(rename_subreddit).delete(delete_subreddit))
        .route("/{id}/toggle", patch(toggle_subreddit))
}
