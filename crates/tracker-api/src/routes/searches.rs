//! 검색 이력 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/searches/history?page=&limit=` - 검색 이력 (최신순, 페이지네이션)
//! - `DELETE /api/v1/searches/{id}` - 검색 레코드 삭제

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use tracker_core::domain::record::SearchRecordData;

use crate::error::{db_error, db_not_configured, not_found, ApiErrorResponse, ApiResult};
use crate::repository::{TickerSearchRecord, TickerSearchRepository};
use crate::state::AppState;

/// 이력 조회 쿼리 파라미터.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    /// 페이지 번호 (1부터, 기본 1)
    pub page: Option<i64>,
    /// 페이지 크기 (기본 10)
    pub limit: Option<i64>,
}

/// 이력 한 건 요약.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub ticker: String,
    pub search_query: String,
    pub created_at: DateTime<Utc>,
    /// 이 검색이 다룬 서브레딧 목록
    pub subreddits: Vec<String>,
    /// 저장된 게시글 수 합계
    pub result_count: usize,
}

/// 이력 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHistoryResponse {
    pub searches: Vec<SearchHistoryEntry>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total_count: i64,
}

/// 삭제 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteSearchResponse {
    pub success: bool,
}

/// 레코드를 이력 항목으로 요약합니다.
///
/// 검색 데이터가 없는 행(섹션 컬럼만 채워진 행)은 서브레딧 없이
/// 게시글 0건으로 요약됩니다.
pub fn summarize_record(record: &TickerSearchRecord) -> SearchHistoryEntry {
    let (subreddits, result_count) = match record.search_record_data() {
        Some(SearchRecordData::Legacy { subreddit, posts }) => (vec![subreddit], posts.len()),
        Some(SearchRecordData::Unified(unified)) => {
            let count = unified.subreddits.values().map(|entry| entry.count).sum();
            (unified.subreddits.keys().cloned().collect(), count)
        }
        None => (Vec::new(), 0),
    };

    SearchHistoryEntry {
        id: record.id,
        ticker: record.ticker.clone(),
        search_query: record
            .search_query
            .clone()
            .unwrap_or_else(|| record.ticker.clone()),
        created_at: record.created_at,
        subreddits,
        result_count,
    }
}

/// 검색 이력 조회.
///
/// GET /api/v1/searches/history
#[utoipa::path(
    get,
    path = "/api/v1/searches/history",
    params(
        ("page" = Option<i64>, Query, description = "페이지 번호 (기본 1)"),
        ("limit" = Option<i64>, Query, description = "페이지 크기 (기본 10)")
    ),
    responses((status = 200, description = "검색 이력", body = SearchHistoryResponse)),
    tag = "searches"
)]
pub async fn search_history(
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SearchHistoryResponse>> {
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let (records, total_count) = TickerSearchRepository::history_page(pool, offset, limit)
        .await
        .map_err(db_error)?;

    let searches = records.iter().map(summarize_record).collect();
    let total_pages = (total_count + limit - 1) / limit;

    Ok(Json(SearchHistoryResponse {
        searches,
        total_pages,
        current_page: page,
        total_count,
    }))
}

/// 검색 레코드 삭제.
///
/// DELETE /api/v1/searches/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/searches/{id}",
    params(("id" = Uuid, Path, description = "검색 레코드 id")),
    responses(
        (status = 200, description = "삭제 성공", body = DeleteSearchResponse),
        (status = 404, description = "레코드 없음", body = ApiErrorResponse)
    ),
    tag = "searches"
)]
pub async fn delete_search(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeleteSearchResponse>> {
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let deleted = TickerSearchRepository::delete(pool, id)
        .await
        .map_err(db_error)?;

    if !deleted {
        return Err(not_found(format!("검색 레코드를 찾을 수 없습니다: {}", id)));
    }

    Ok(Json(DeleteSearchResponse { success: true }))
}

/// 검색 이력 라우터 생성.
pub fn searches_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history", get(search_history))
        .route("/{id}", delete(delete_search))
}
