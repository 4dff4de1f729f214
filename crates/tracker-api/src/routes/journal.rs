//! 매매일지 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/ticker/{ticker}/journal` - 일지 저장 (날짜당 1건 upsert)
//! - `GET /api/v1/ticker/{ticker}/journal` - 일지 목록 (날짜 내림차순)
//! - `GET /api/v1/ticker/{ticker}/journal/today` - 오늘 일지
//! - `DELETE /api/v1/ticker/{ticker}/journal/{id}` - 일지 삭제

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use tracker_core::types::Ticker;

use crate::error::{
    db_error, db_not_configured, invalid_input, not_found, ApiErrorResponse, ApiResult,
};
use crate::repository::{JournalRecord, JournalRepository};
use crate::state::AppState;

/// 일지 저장 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveJournalRequest {
    /// 일지 내용 (빈 문자열 허용, 누락은 불가)
    pub content: Option<String>,
    /// 대상 날짜 (기본: 오늘)
    pub entry_date: Option<NaiveDate>,
}

/// 일지 저장 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveJournalResponse {
    pub success: bool,
    pub ticker: String,
    pub journal: JournalRecord,
}

/// 일지 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct JournalListResponse {
    pub success: bool,
    pub ticker: String,
    pub journals: Vec<JournalRecord>,
    pub count: usize,
}

/// 오늘 일지 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TodayJournalResponse {
    pub success: bool,
    pub ticker: String,
    /// 오늘 일지 (없으면 null)
    pub journal: Option<JournalRecord>,
}

/// 삭제 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteJournalResponse {
    pub success: bool,
}

/// 일지 저장 (upsert).
///
/// POST /api/v1/ticker/{ticker}/journal
#[utoipa::path(
    post,
    path = "/api/v1/ticker/{ticker}/journal",
    params(("ticker" = String, Path, description = "티커 심볼")),
    request_body = SaveJournalRequest,
    responses(
        (status = 200, description = "저장된 일지", body = SaveJournalResponse),
        (status = 400, description = "content 누락", body = ApiErrorResponse)
    ),
    tag = "journal"
)]
pub async fn save_journal(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveJournalRequest>,
) -> ApiResult<Json<SaveJournalResponse>> {
    let ticker = Ticker::parse(&ticker).map_err(|e| invalid_input(e.to_string()))?;
    let content = request
        .content
        .ok_or_else(|| invalid_input("content가 필요합니다"))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let entry_date = request.entry_date.unwrap_or_else(|| Utc::now().date_naive());

    let journal = JournalRepository::upsert(pool, ticker.as_str(), entry_date, &content)
        .await
        .map_err(db_error)?;

    Ok(Json(SaveJournalResponse {
        success: true,
        ticker: ticker.to_string(),
        journal,
    }))
}

/// 일지 목록 조회.
///
/// GET /api/v1/ticker/{ticker}/journal
#[utoipa::path(
    get,
    path = "/api/v1/ticker/{ticker}/journal",
    params(("ticker" = String, Path, description = "티커 심볼")),
    responses((status = 200, description = "일지 목록", body = JournalListResponse)),
    tag = "journal"
)]
pub async fn list_journals(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<JournalListResponse>> {
    let ticker = Ticker::parse(&ticker).map_err(|e| invalid_input(e.to_string()))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let journals = JournalRepository::list_for_ticker(pool, ticker.as_str())
        .await
        .map_err(db_error)?;

    Ok(Json(JournalListResponse {
        success: true,
        ticker: ticker.to_string(),
        count: journals.len(),
        journals,
    }))
}

/// 오늘 일지 조회.
///
/// GET /api/v1/ticker/{ticker}/journal/today
#[utoipa::path(
    get,
    path = "/api/v1/ticker/{ticker}/journal/today",
    params(("ticker" = String, Path, description = "티커 심볼")),
    responses((status = 200, description = "오늘 일지", body = TodayJournalResponse)),
    tag = "journal"
)]
pub async fn today_journal(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TodayJournalResponse>> {
    let ticker = Ticker::parse(&ticker).map_err(|e| invalid_input(e.to_string()))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let journal =
        JournalRepository::find_for_date(pool, ticker.as_str(), Utc::now().date_naive())
            .await
            .map_err(db_error)?;

    Ok(Json(TodayJournalResponse {
        success: true,
        ticker: ticker.to_string(),
        journal,
    }))
}

/// 일지 삭제.
///
/// DELETE /api/v1/ticker/{ticker}/journal/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/ticker/{ticker}/journal/{id}",
    params(
        ("ticker" = String, Path, description = "티커 심볼"),
        ("id" = Uuid, Path, description = "일지 id")
    ),
    responses(
        (status = 200, description = "삭제 성공", body = DeleteJournalResponse),
        (status = 404, description = "일지 없음", body = ApiErrorResponse)
    ),
    tag = "journal"
)]
pub async fn delete_journal(
    Path((ticker, id)): Path<(String, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeleteJournalResponse>> {
    let ticker = Ticker::parse(&ticker).map_err(|e| invalid_input(e.to_string()))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let deleted = JournalRepository::delete(pool, ticker.as_str(), id)
        .await
        .map_err(db_error)?;

    if !deleted {
        return Err(not_found(format!("일지를 찾을 수 없습니다: {}", id)));
    }

    Ok(Json(DeleteJournalResponse { success: true }))
}

/// 일지 라우터 생성 (`/api/v1/ticker` 하위에 중첩).
pub fn journal_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{ticker}/journal", post(save_journal).get(list_journals))
        .route("/{ticker}/journal/today", get(today_journal))
        .route("/{ticker}/journal/{id}", delete(delete_journal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        journal_router().with_state(Arc::new(create_test_state()))
    }

    #[tokio::test]
    async fn test_save_journal_requires_content() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/GME/journal")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "entry_date": "2025-06-01" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        // content 검증이 DB 접근보다 먼저 수행됨
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_journal_rejects_invalid_ticker() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/G!!ME/journal")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "content": "memo" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_journal_endpoints_without_db_return_503() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/GME/journal")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
