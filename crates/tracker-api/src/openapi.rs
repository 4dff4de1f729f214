//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::repository::{JournalRecord, SubredditRecord};
use crate::routes::{
    CompanySummaryResponse, ComponentHealth, ComponentStatus, DateRange, DeleteJournalResponse,
    DeleteSearchResponse, DeleteSubredditResponse, EarningsCallsResponse, FundamentalsResponse,
    HealthResponse, JournalListResponse, NewsResponse, PipelineResponse, RatiosResponse,
    RedditSearchRequest, RedditSearchResponse, SaveJournalRequest, SaveJournalResponse,
    SearchHistoryEntry, SearchHistoryResponse, SentimentSummaryResponse, StoredSearch,
    SubredditNameRequest, SubredditResult, TickerDataResponse, TickerFundamentalsResponse,
    TickerRequest, TickerStats, TodayJournalResponse, TranscriptRequest, TranscriptResponse,
    TranscriptsCheckRequest, TranscriptsCheckResponse,
};

/// Ticker Tracker API 문서.
///
/// 모든 엔드포인트와 스키마를 포함하는 OpenAPI 3.0 스펙입니다.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticker Tracker API",
        version = "0.1.0",
        description = r#"
# 티커 트래커 REST API

티커별 서드파티 금융 데이터(펀더멘털, 뉴스, 재무비율, 실적발표)와
Reddit 소셜 데이터를 수집/저장/조회하는 API입니다.

## 주요 기능

- **Reddit 검색 집계**: hot/new 병합, relevance 랭킹, 댓글 확장
- **펀더멘털/뉴스**: EODHD 수집 및 정규화
- **재무비율/실적발표**: roic.ai 수집, 녹취록 30일 캐시
- **매매일지**: 티커별 일 단위 일지
- **AI 요약**: 수집 텍스트의 구조화 요약
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::reddit::search_reddit,
        crate::routes::ticker::get_ticker_data,
        crate::routes::ticker::get_ticker_fundamentals,
        crate::routes::ticker::get_ticker_stats,
        crate::routes::journal::save_journal,
        crate::routes::journal::list_journals,
        crate::routes::journal::today_journal,
        crate::routes::journal::delete_journal,
        crate::routes::eodhd::fetch_fundamentals,
        crate::routes::eodhd::fetch_news,
        crate::routes::ratios::fetch_liquidity_ratios,
        crate::routes::ratios::fetch_credit_ratios,
        crate::routes::earnings::fetch_earnings_calls,
        crate::routes::earnings::fetch_transcript,
        crate::routes::earnings::check_transcripts,
        crate::routes::subreddits::list_subreddits,
        crate::routes::subreddits::add_subreddit,
        crate::routes::subreddits::rename_subreddit,
        crate::routes::subreddits::toggle_subreddit,
        crate::routes::subreddits::delete_subreddit,
        crate::routes::searches::search_history,
        crate::routes::searches::delete_search,
        crate::routes::pipeline::run_pipeline,
        crate::routes::agents::summarize_sentiment,
        crate::routes::agents::summarize_company,
    ),
    components(schemas(
        ApiErrorResponse,
        HealthResponse,
        ComponentHealth,
        ComponentStatus,
        RedditSearchRequest,
        RedditSearchResponse,
        SubredditResult,
        TickerDataResponse,
        StoredSearch,
        TickerFundamentalsResponse,
        TickerStats,
        DateRange,
        SaveJournalRequest,
        SaveJournalResponse,
        JournalListResponse,
        TodayJournalResponse,
        DeleteJournalResponse,
        JournalRecord,
        TickerRequest,
        FundamentalsResponse,
        NewsResponse,
        RatiosResponse,
        EarningsCallsResponse,
        TranscriptRequest,
        TranscriptResponse,
        TranscriptsCheckRequest,
        TranscriptsCheckResponse,
        SubredditNameRequest,
        SubredditRecord,
        DeleteSubredditResponse,
        SearchHistoryEntry,
        SearchHistoryResponse,
        DeleteSearchResponse,
        PipelineResponse,
        SentimentSummaryResponse,
        CompanySummaryResponse,
    )),
    tags(
        (name = "health", description = "헬스 체크"),
        (name = "reddit", description = "Reddit 검색 집계"),
        (name = "ticker", description = "저장 데이터 조회/통계"),
        (name = "journal", description = "매매일지"),
        (name = "eodhd", description = "펀더멘털/뉴스 수집"),
        (name = "ratios", description = "재무비율 수집"),
        (name = "earnings", description = "실적발표 목록/녹취록"),
        (name = "subreddits", description = "즐겨찾기 서브레딧"),
        (name = "searches", description = "검색 이력"),
        (name = "pipeline", description = "순차 수집 파이프라인"),
        (name = "agents", description = "AI 요약")
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// `/swagger-ui`에서 UI를, `/api-docs/openapi.json`에서 스펙을
/// 제공합니다.
pub fn swagger_ui_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_builds() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        assert!(json.contains("/api/v1/reddit/search"));
        assert!(json.contains("/api/v1/earnings/transcript"));
    }
}
