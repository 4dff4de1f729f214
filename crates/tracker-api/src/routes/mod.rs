//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/reddit/search` - Reddit 검색 집계
//! - `/api/v1/ticker/{ticker}/...` - 저장 데이터/통계/일지 조회
//! - `/api/v1/fundamentals`, `/api/v1/news` - EODHD 수집
//! - `/api/v1/ratios/...` - roic.ai 재무비율 수집
//! - `/api/v1/earnings/...` - 실적발표 목록/녹취록
//! - `/api/v1/subreddits` - 즐겨찾기 서브레딧 관리
//! - `/api/v1/searches` - 검색 이력
//! - `/api/v1/pipeline` - 순차 수집 파이프라인
//! - `/api/v1/agents/...` - AI 요약

pub mod agents;
pub mod earnings;
pub mod eodhd;
pub mod health;
pub mod journal;
pub mod pipeline;
pub mod ratios;
pub mod reddit;
pub mod searches;
pub mod subreddits;
pub mod ticker;

pub use agents::{agents_router, CompanySummaryResponse, SentimentSummaryResponse};
pub use earnings::{
    earnings_router, EarningsCallsResponse, TranscriptRequest, TranscriptResponse,
    TranscriptsCheckRequest, TranscriptsCheckResponse,
};
pub use eodhd::{eodhd_router, FundamentalsResponse, NewsResponse, TickerRequest};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use journal::{
    journal_router, DeleteJournalResponse, JournalListResponse, SaveJournalRequest,
    SaveJournalResponse, TodayJournalResponse,
};
pub use pipeline::{pipeline_router, PipelineResponse};
pub use ratios::{ratios_router, RatiosResponse};
pub use reddit::{reddit_router, RedditSearchRequest, RedditSearchResponse, SubredditResult};
pub use searches::{
    searches_router, DeleteSearchResponse, SearchHistoryEntry, SearchHistoryResponse,
};
pub use subreddits::{subreddits_router, DeleteSubredditResponse, SubredditNameRequest};
pub use ticker::{
    ticker_router, DateRange, StoredSearch, TickerDataResponse, TickerFundamentalsResponse,
    TickerStats,
};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/reddit", reddit_router())
        // 티커 하위에 조회/일지 라우터를 합쳐서 중첩
        .nest("/api/v1/ticker", ticker_router().merge(journal_router()))
        // EODHD 수집 (/api/v1/fundamentals, /api/v1/news)
        .nest("/api/v1", eodhd_router())
        .nest("/api/v1/ratios", ratios_router())
        .nest("/api/v1/earnings", earnings_router())
        .nest("/api/v1/subreddits", subreddits_router())
        .nest("/api/v1/searches", searches_router())
        .nest("/api/v1/pipeline", pipeline_router())
        .nest("/api/v1/agents", agents_router())
}
