//! AI 에이전트 요약 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/agents/sentiment` - 저장된 검색 데이터의 감성 요약
//! - `POST /api/v1/agents/company` - 저장된 펀더멘털의 회사 요약
//!
//! 두 엔드포인트 모두 저장된 데이터를 입력으로 사용합니다.
//! 에이전트 클라이언트가 설정되지 않았으면 503을 반환합니다.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use tracker_agents::{CompanySummary, CompanySummaryAgent, SentimentAgent, SentimentSummary};
use tracker_core::domain::fundamentals::FundamentalSnapshot;

use crate::error::{
    agent_error, client_not_configured, db_error, db_not_configured, invalid_input, not_found,
    ApiErrorResponse, ApiResult,
};
use crate::repository::TickerSearchRepository;
use crate::routes::eodhd::TickerRequest;
use crate::state::AppState;

/// 감성 요약 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct SentimentSummaryResponse {
    pub success: bool,
    pub ticker: String,
    pub summary: SentimentSummary,
}

/// 회사 요약 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompanySummaryResponse {
    pub success: bool,
    pub ticker: String,
    pub summary: CompanySummary,
}

/// 저장된 검색 데이터의 감성 요약 실행.
///
/// POST /api/v1/agents/sentiment
#[utoipa::path(
    post,
    path = "/api/v1/agents/sentiment",
    request_body = TickerRequest,
    responses(
        (status = 200, description = "감성 요약", body = SentimentSummaryResponse),
        (status = 404, description = "저장된 검색 데이터 없음", body = ApiErrorResponse),
        (status = 503, description = "에이전트 미설정", body = ApiErrorResponse)
    ),
    tag = "agents"
)]
pub async fn summarize_sentiment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TickerRequest>,
) -> ApiResult<Json<SentimentSummaryResponse>> {
    let ticker = request.parse_ticker().map_err(invalid_input)?;
    let client = state
        .agents
        .as_ref()
        .ok_or_else(|| client_not_configured("에이전트"))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let record = TickerSearchRepository::latest_for_ticker(pool, ticker.as_str())
        .await
        .map_err(db_error)?;

    let unified = record
        .and_then(|r| r.unified_data())
        .ok_or_else(|| not_found(format!("{}의 저장된 검색 데이터가 없습니다", ticker)))?;

    let summary = SentimentAgent::new(client.clone())
        .run(&unified)
        .await
        .map_err(agent_error)?;

    Ok(Json(SentimentSummaryResponse {
        success: true,
        ticker: ticker.to_string(),
        summary,
    }))
}

/// 저장된 펀더멘털의 회사 요약 실행.
///
/// POST /api/v1/agents/company
#[utoipa::path(
    post,
    path = "/api/v1/agents/company",
    request_body = TickerRequest,
    responses(
        (status = 200, description = "회사 요약", body = CompanySummaryResponse),
        (status = 404, description = "저장된 펀더멘털 없음", body = ApiErrorResponse),
        (status = 503, description = "에이전트 미설정", body = ApiErrorResponse)
    ),
    tag = "agents"
)]
pub async fn summarize_company(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TickerRequest>,
) -> ApiResult<Json<CompanySummaryResponse>> {
    let ticker = request.parse_ticker().map_err(invalid_input)?;
    let client = state
        .agents
        .as_ref()
        .ok_or_else(|| client_not_configured("에이전트"))?;
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let stored = TickerSearchRepository::latest_fundamentals(pool, ticker.as_str())
        .await
        .map_err(db_error)?;

    let snapshot: FundamentalSnapshot = match stored {
        Some((data, _)) => serde_json::from_value(data)
            .map_err(|e| crate::error::internal_error(e.to_string()))?,
        None => {
            return Err(not_found(format!(
                "{}의 저장된 펀더멘털 데이터가 없습니다",
                ticker
            )))
        }
    };

    let summary = CompanySummaryAgent::new(client.clone())
        .run(&snapshot)
        .await
        .map_err(agent_error)?;

    Ok(Json(CompanySummaryResponse {
        success: true,
        ticker: ticker.to_string(),
        summary,
    }))
}

/// 에이전트 라우터 생성.
pub fn agents_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sentiment", post(summarize_sentiment))
        .route("/company", post(summarize_company))
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

    #[tokio::test]
    async fn test_sentiment_without_agent_returns_503() {
        let app = agents_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sentiment")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "ticker": "GME" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
