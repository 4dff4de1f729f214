//! 티커 데이터 파이프라인 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/pipeline` - 펀더멘털 → Reddit 집계 → (선택) 에이전트 요약
//!
//! 단계들은 순차적으로 await되며 병렬 조정/재시도/부분 복구가
//! 없습니다. 한 단계가 실패하면 그 에러가 그대로 전파되어 호출이
//! 중단됩니다. 에이전트 단계는 에이전트 클라이언트가 설정된 경우에만
//! 실행됩니다.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use tracker_agents::{CompanySummary, CompanySummaryAgent, SentimentAgent, SentimentSummary};
use tracker_core::domain::fundamentals::FundamentalSnapshot;
use tracker_core::types::Ticker;

use crate::error::{
    agent_error, client_not_configured, data_error, invalid_input, ApiErrorResponse, ApiResult,
};
use crate::repository::SectionColumn;
use crate::routes::eodhd::store_section;
use crate::routes::reddit::{run_search, RedditSearchRequest, RedditSearchResponse};
use crate::state::AppState;

/// 파이프라인 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct PipelineResponse {
    pub success: bool,
    pub ticker: String,
    /// 1단계: 펀더멘털 스냅샷
    pub fundamental: FundamentalSnapshot,
    /// 2단계: Reddit 집계 결과
    pub reddit: RedditSearchResponse,
    /// 3단계: 회사 요약 (에이전트 설정 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_summary: Option<CompanySummary>,
    /// 3단계: 감성 요약 (에이전트 설정 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentSummary>,
}

/// 파이프라인 실행.
///
/// POST /api/v1/pipeline
#[utoipa::path(
    post,
    path = "/api/v1/pipeline",
    request_body = RedditSearchRequest,
    responses(
        (status = 200, description = "파이프라인 결과", body = PipelineResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "EODHD 미설정", body = ApiErrorResponse)
    ),
    tag = "pipeline"
)]
pub async fn run_pipeline(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RedditSearchRequest>,
) -> ApiResult<Json<PipelineResponse>> {
    request
        .validate()
        .map_err(|e| invalid_input(e.to_string()))?;
    let ticker = Ticker::parse(&request.ticker).map_err(|e| invalid_input(e.to_string()))?;

    // 1단계: 펀더멘털. 실패 시 체인 전체 중단
    let eodhd = state
        .eodhd
        .as_ref()
        .ok_or_else(|| client_not_configured("EODHD"))?;
    let fundamental = eodhd
        .fetch_fundamentals(&ticker)
        .await
        .map_err(data_error)?;

    let payload = serde_json::to_value(&fundamental)
        .map_err(|e| crate::error::internal_error(e.to_string()))?;
    store_section(
        state.db_pool.as_ref(),
        &ticker,
        SectionColumn::Fundamental,
        &payload,
    )
    .await;

    // 2단계: Reddit 집계
    let run = run_search(&state, &ticker, &request.subreddits).await?;
    let reddit = run.response;

    // 3단계: 에이전트 요약 (설정된 경우에만)
    let (company_summary, sentiment) = match &state.agents {
        Some(client) => {
            let company = CompanySummaryAgent::new(client.clone())
                .run(&fundamental)
                .await
                .map_err(agent_error)?;

            let sentiment = SentimentAgent::new(client.clone())
                .run(&run.unified)
                .await
                .map_err(agent_error)?;

            (Some(company), Some(sentiment))
        }
        None => (None, None),
    };

    info!(
        ticker = %ticker,
        total_posts = reddit.total_posts,
        with_agents = company_summary.is_some(),
        "Pipeline complete"
    );

    Ok(Json(PipelineResponse {
        success: true,
        ticker: ticker.to_string(),
        fundamental,
        reddit,
        company_summary,
        sentiment,
    }))
}

/// 파이프라인 라우터 생성.
pub fn pipeline_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(run_pipeline))
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

    fn request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_validates_before_clients() {
        let app = pipeline_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(request(json!({ "ticker": "", "subreddits": [] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pipeline_without_eodhd_returns_503() {
        let app = pipeline_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(request(
                json!({ "ticker": "GME", "subreddits": ["stocks"] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
