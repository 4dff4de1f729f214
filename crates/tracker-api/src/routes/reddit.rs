//! Reddit 검색 집계 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/reddit/search` - 서브레딧 집합에서 티커 검색 집계
//!
//! 입력 검증 실패(티커/서브레딧 누락 또는 빈 값)는 네트워크 호출
//! 전에 400으로 반환됩니다. 개별 서브레딧 실패는 해당 항목의
//! `error` 필드로 격리되고, 저장 실패는 `warning` 필드로 전달될 뿐
//! 호출 자체는 성공합니다.

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use validator::Validate;

use tracker_core::domain::reddit::{RedditPost, SearchMetadata};
use tracker_core::types::Ticker;
use tracker_data::RedditAggregator;

use crate::error::{data_error, invalid_input, ApiErrorResponse, ApiResult};
use crate::repository::TickerSearchRepository;
use crate::state::AppState;

/// 검색 요청 본문.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RedditSearchRequest {
    /// 검색할 티커
    #[serde(default)]
    #[validate(length(min = 1, message = "티커가 비어 있습니다"))]
    pub ticker: String,
    /// 검색할 서브레딧 목록 (비어 있으면 안 됨)
    #[serde(default)]
    #[validate(length(min = 1, message = "서브레딧 목록이 비어 있습니다"))]
    pub subreddits: Vec<String>,
}

/// 서브레딧 하나의 응답 항목.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubredditResult {
    /// 서브레딧 이름
    pub subreddit: String,
    /// 게시글 수
    pub count: usize,
    /// 랭킹 순 게시글
    pub posts: Vec<RedditPost>,
    /// 수집 실패 사유 (성공 시 생략)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 검색 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedditSearchResponse {
    /// 검색한 티커
    pub ticker: String,
    /// 응답 생성 시각
    pub timestamp: DateTime<Utc>,
    /// 입력 순서의 서브레딧별 결과
    pub results: Vec<SubredditResult>,
    /// 전체 게시글 수
    pub total_posts: usize,
    /// 전체 댓글 수
    pub total_comments: usize,
    /// 댓글이 첨부된 게시글 수
    pub posts_with_comments: usize,
    /// 검색 메타데이터
    pub metadata: SearchMetadata,
    /// 저장 경고 (저장 실패 또는 저장소 미설정 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Reddit 검색 집계 실행.
///
/// POST /api/v1/reddit/search
#[utoipa::path(
    post,
    path = "/api/v1/reddit/search",
    request_body = RedditSearchRequest,
    responses(
        (status = 200, description = "집계 결과", body = RedditSearchResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse)
    ),
    tag = "reddit"
)]
pub async fn search_reddit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RedditSearchRequest>,
) -> ApiResult<Json<RedditSearchResponse>> {
    // 네트워크/저장소 접근 전에 전체 검증
    request
        .validate()
        .map_err(|e| invalid_input(e.to_string()))?;
    let ticker = Ticker::parse(&request.ticker).map_err(|e| invalid_input(e.to_string()))?;

    let run = run_search(&state, &ticker, &request.subreddits).await?;
    Ok(Json(run.response))
}

/// 집계 실행 결과. 응답과 저장 형식 데이터를 함께 돌려줍니다.
pub(crate) struct SearchRun {
    /// API 응답 본문
    pub response: RedditSearchResponse,
    /// 통합 검색 데이터 (에이전트 입력 등 후속 단계용)
    pub unified: tracker_core::domain::reddit::UnifiedSearchData,
}

/// 검증된 입력으로 집계를 실행하고 응답을 조립합니다.
///
/// 파이프라인 단계에서도 재사용됩니다.
pub(crate) async fn run_search(
    state: &AppState,
    ticker: &Ticker,
    subreddits: &[String],
) -> ApiResult<SearchRun> {
    // 요청마다 새 집계기를 만들며, 호출 간 공유 상태는 없음
    let aggregator = RedditAggregator::new(
        state.reddit.clone(),
        state.config.reddit.comment_fetch_delay(),
    );

    let outcome = aggregator
        .search(ticker, subreddits)
        .await
        .map_err(data_error)?;

    // 저장 실패는 응답을 실패시키지 않고 warning으로 전달
    let warning = match &state.db_pool {
        Some(pool) => {
            match TickerSearchRepository::save_unified(
                pool,
                ticker.as_str(),
                ticker.as_str(),
                &outcome.unified,
            )
            .await
            {
                Ok(_) => None,
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "Failed to persist search results");
                    Some("검색 결과를 저장하지 못했습니다".to_string())
                }
            }
        }
        None => Some("저장소 미설정: 검색 결과가 저장되지 않았습니다".to_string()),
    };

    let metadata = outcome.unified.metadata.clone();
    let results = outcome
        .results
        .into_iter()
        .map(|(subreddit, entry)| SubredditResult {
            subreddit,
            count: entry.count,
            posts: entry.posts,
            error: entry.error,
        })
        .collect();

    Ok(SearchRun {
        response: RedditSearchResponse {
            ticker: ticker.to_string(),
            timestamp: Utc::now(),
            results,
            total_posts: metadata.total_posts,
            total_comments: metadata.total_comments,
            posts_with_comments: metadata.posts_with_comments,
            metadata,
            warning,
        },
        unified: outcome.unified,
    })
}

/// Reddit 검색 라우터 생성.
pub fn reddit_router() -> Router<Arc<AppState>> {
    Router::new().route("/search", post(search_reddit))
}
