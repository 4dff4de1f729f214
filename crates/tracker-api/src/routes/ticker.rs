//! 티커 조회 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/ticker/{ticker}/data` - 저장된 검색 레코드 전체 (통합 형식)
//! - `GET /api/v1/ticker/{ticker}/fundamentals` - 최근 펀더멘털 데이터
//! - `GET /api/v1/ticker/{ticker}/stats` - 저장 레코드 전체에 대한 통계

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use tracker_core::domain::reddit::{RedditPost, UnifiedSearchData};
use tracker_core::types::Ticker;

use crate::error::{db_error, db_not_configured, invalid_input, ApiErrorResponse, ApiResult};
use crate::repository::TickerSearchRepository;
use crate::state::AppState;

/// 저장된 검색 한 건 (통합 형식).
#[derive(Debug, Serialize, ToSchema)]
pub struct StoredSearch {
    /// 레코드 id
    pub id: Uuid,
    /// 저장 시각
    pub created_at: DateTime<Utc>,
    /// 통합 검색 데이터 (legacy 행은 변환됨)
    pub data: UnifiedSearchData,
}

/// 티커 데이터 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TickerDataResponse {
    pub ticker: String,
    pub searches: Vec<StoredSearch>,
    pub total_searches: usize,
}

/// 펀더멘털 조회 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TickerFundamentalsResponse {
    pub ticker: String,
    /// 저장된 펀더멘털 데이터 (없으면 null)
    pub fundamental_data: Option<Value>,
    /// 데이터 갱신 시각
    pub updated_at: Option<DateTime<Utc>>,
    /// 데이터가 없을 때의 안내 메시지
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 검색 날짜 범위.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DateRange {
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

/// 티커 통계.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct TickerStats {
    /// 저장된 검색 수
    pub total_searches: usize,
    /// 고유 게시글 수 (id 기준 중복 제거)
    pub total_posts: usize,
    /// 고유 서브레딧 수
    pub unique_subreddits: usize,
    /// 고유 게시글의 평균 score (반올림)
    pub average_score: i64,
    /// 고유 게시글의 댓글 수 합
    pub total_comments: i64,
    /// score가 가장 높은 게시글
    pub top_post: Option<RedditPost>,
    /// 게시글이 가장 많은 서브레딧
    pub most_active_subreddit: Option<String>,
    /// 서브레딧별 게시글 수 (중복 포함)
    pub posts_by_subreddit: BTreeMap<String, usize>,
    /// 날짜별 게시글 수 (중복 포함)
    pub posts_by_date: BTreeMap<String, usize>,
    /// 검색 날짜 범위
    pub date_range: DateRange,
}

/// 저장 레코드들에서 통계를 계산합니다.
///
/// 게시글 중복 제거는 전체 레코드에 걸쳐 id 기준으로 수행합니다.
/// 서브레딧/날짜별 집계는 저장 당시 개수를 그대로 합산합니다.
pub fn compute_ticker_stats(records: &[(DateTime<Utc>, UnifiedSearchData)]) -> TickerStats {
    let mut stats = TickerStats {
        total_searches: records.len(),
        ..TickerStats::default()
    };

    if records.is_empty() {
        return stats;
    }

    let mut unique_posts: Vec<&RedditPost> = Vec::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut subreddit_names: HashSet<&str> = HashSet::new();

    for (created_at, unified) in records {
        let date_key = created_at.format("%Y-%m-%d").to_string();

        for (subreddit, entry) in &unified.subreddits {
            subreddit_names.insert(subreddit.as_str());

            if !entry.posts.is_empty() {
                *stats.posts_by_subreddit.entry(subreddit.clone()).or_default() +=
                    entry.posts.len();
                *stats.posts_by_date.entry(date_key.clone()).or_default() += entry.posts.len();
            }

            for post in &entry.posts {
                if seen_ids.insert(post.id.as_str()) {
                    unique_posts.push(post);
                }
            }
        }
    }

    stats.total_posts = unique_posts.len();
    stats.unique_subreddits = subreddit_names.len();

    if !unique_posts.is_empty() {
        let total_score: i64 = unique_posts.iter().map(|p| p.score).sum();
        stats.average_score =
            (total_score as f64 / unique_posts.len() as f64).round() as i64;
        stats.total_comments = unique_posts.iter().map(|p| p.num_comments).sum();
        stats.top_post = unique_posts
            .iter()
            .max_by_key(|p| p.score)
            .map(|p| (*p).clone());
        stats.most_active_subreddit = stats
            .posts_by_subreddit
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(name, _)| name.clone());
    }

    let mut dates: Vec<DateTime<Utc>> = records.iter().map(|(at, _)| *at).collect();
    dates.sort();
    stats.date_range = DateRange {
        first: dates.first().copied(),
        last: dates.last().copied(),
    };

    stats
}

/// 티커의 저장된 검색 레코드 조회.
///
/// GET /api/v1/ticker/{ticker}/data
#[utoipa::path(
    get,
    path = "/api/v1/ticker/{ticker}/data",
    params(("ticker" = String, Path, description = "티커 심볼")),
    responses(
        (status = 200, description = "저장된 검색 레코드", body = TickerDataResponse),
        (status = 400, description = "유효하지 않은 티커", body = ApiErrorResponse)
    ),
    tag = "ticker"
)]
pub async fn get_ticker_data(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TickerDataResponse>> {
    let ticker = Ticker::parse(&ticker).map_err(|e| invalid_input(e.to_string()))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let records = TickerSearchRepository::list_for_ticker(pool, ticker.as_str())
        .await
        .map_err(db_error)?;

    let searches: Vec<StoredSearch> = records
        .into_iter()
        .filter_map(|record| {
            let data = record.unified_data()?;
            Some(StoredSearch {
                id: record.id,
                created_at: record.created_at,
                data,
            })
        })
        .collect();

    Ok(Json(TickerDataResponse {
        ticker: ticker.to_string(),
        total_searches: searches.len(),
        searches,
    }))
}

/// 티커의 최근 펀더멘털 데이터 조회.
///
/// GET /api/v1/ticker/{ticker}/fundamentals
#[utoipa::path(
    get,
    path = "/api/v1/ticker/{ticker}/fundamentals",
    params(("ticker" = String, Path, description = "티커 심볼")),
    responses(
        (status = 200, description = "저장된 펀더멘털 데이터", body = TickerFundamentalsResponse)
    ),
    tag = "ticker"
)]
pub async fn get_ticker_fundamentals(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TickerFundamentalsResponse>> {
    let ticker = Ticker::parse(&ticker).map_err(|e| invalid_input(e.to_string()))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let stored = TickerSearchRepository::latest_fundamentals(pool, ticker.as_str())
        .await
        .map_err(db_error)?;

    let response = match stored {
        Some((data, updated_at)) => TickerFundamentalsResponse {
            ticker: ticker.to_string(),
            fundamental_data: Some(data),
            updated_at,
            message: None,
        },
        None => TickerFundamentalsResponse {
            ticker: ticker.to_string(),
            fundamental_data: None,
            updated_at: None,
            message: Some("이 티커의 펀더멘털 데이터가 없습니다".to_string()),
        },
    };

    Ok(Json(response))
}

/// 티커 통계 조회.
///
/// GET /api/v1/ticker/{ticker}/stats
#[utoipa::path(
    get,
    path = "/api/v1/ticker/{ticker}/stats",
    params(("ticker" = String, Path, description = "티커 심볼")),
    responses(
        (status = 200, description = "티커 통계", body = TickerStats)
    ),
    tag = "ticker"
)]
pub async fn get_ticker_stats(
    Path(ticker): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TickerStats>> {
    let ticker = Ticker::parse(&ticker).map_err(|e| invalid_input(e.to_string()))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let records = TickerSearchRepository::list_for_ticker(pool, ticker.as_str())
        .await
        .map_err(db_error)?;

    let unified_records: Vec<(DateTime<Utc>, UnifiedSearchData)> = records
        .into_iter()
        .filter_map(|record| Some((record.created_at, record.unified_data()?)))
        .collect();

    Ok(Json(compute_ticker_stats(&unified_records)))
}

/// 티커 라우터 생성.
pub fn ticker_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{ticker}/data", get(get_ticker_data))
        .route("/{ticker}/fundamentals", get(get_ticker_fundamentals))
        .route("/{ticker}/stats", get(get_ticker_stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tracker_core::domain::reddit::{SearchMetadata, SortMethod, SubredditPosts};

    fn post(id: &str, subreddit: &str, score: i64, num_comments: i64) -> RedditPost {
        RedditPost {
            id: id.to_string(),
            title: format!("post {}", id),
            author: "tester".to_string(),
            subreddit: subreddit.to_string(),
            score,
            num_comments,
            created_utc: 0,
            selftext: String::new(),
            url: String::new(),
            permalink: String::new(),
            sort: SortMethod::Hot,
            comments: Vec::new(),
        }
    }

    fn unified(
        at: DateTime<Utc>,
        entries: Vec<(&str, Vec<RedditPost>)>,
    ) -> (DateTime<Utc>, UnifiedSearchData) {
        let mut subreddits = BTreeMap::new();
        let mut names = Vec::new();
        for (name, posts) in entries {
            names.push(name.to_string());
            subreddits.insert(name.to_string(), SubredditPosts::from_posts(posts, at));
        }
        (
            at,
            UnifiedSearchData {
                subreddits,
                metadata: SearchMetadata {
                    ticker: "GME".to_string(),
                    subreddits: names,
                    searched_at: at,
                    total_posts: 0,
                    total_comments: 0,
                    posts_with_comments: 0,
                },
            },
        )
    }

    #[test]
    fn test_stats_empty() {
        let stats = compute_ticker_stats(&[]);
        assert_eq!(stats.total_searches, 0);
        assert_eq!(stats.total_posts, 0);
        assert!(stats.top_post.is_none());
    }

    #[test]
    fn test_stats_dedup_across_records() {
        let t1 = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 5, 2, 10, 0, 0).unwrap();

        let records = vec![
            unified(
                t1,
                vec![(
                    "wallstreetbets",
                    vec![post("a", "wallstreetbets", 10, 5), post("b", "wallstreetbets", 20, 0)],
                )],
            ),
            // 다음 날 같은 게시글 a가 다시 저장됨
            unified(t2, vec![("wallstreetbets", vec![post("a", "wallstreetbets", 10, 5)])]),
        ];

        let stats = compute_ticker_stats(&records);

        assert_eq!(stats.total_searches, 2);
        assert_eq!(stats.total_posts, 2); // a는 한 번만
        assert_eq!(stats.average_score, 15);
        assert_eq!(stats.total_comments, 5);
        assert_eq!(stats.top_post.as_ref().unwrap().id, "b");
        // 중복 포함 집계는 3건
        assert_eq!(stats.posts_by_subreddit["wallstreetbets"], 3);
        assert_eq!(stats.date_range.first, Some(t1));
        assert_eq!(stats.date_range.last, Some(t2));
    }

    #[test]
    fn test_stats_most_active_subreddit() {
        let t = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        let records = vec![unified(
            t,
            vec![
                ("stocks", vec![post("s1", "stocks", 1, 0)]),
                (
                    "options",
                    vec![post("o1", "options", 2, 0), post("o2", "options", 3, 0)],
                ),
            ],
        )];

        let stats = compute_ticker_stats(&records);

        assert_eq!(stats.most_active_subreddit.as_deref(), Some("options"));
        assert_eq!(stats.unique_subreddits, 2);
        assert_eq!(stats.posts_by_date["2025-05-01"], 3);
    }

    #[test]
    fn test_stats_average_rounds() {
        let t = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        let records = vec![unified(
            t,
            vec![(
                "stocks",
                vec![post("a", "stocks", 1, 0), post("b", "stocks", 2, 0)],
            )],
        )];

        // (1 + 2) / 2 = 1.5 → 2
        assert_eq!(compute_ticker_stats(&records).average_score, 2);
    }
}
