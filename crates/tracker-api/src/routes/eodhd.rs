//! EODHD 수집 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/fundamentals` - 펀더멘털 수집 및 저장
//! - `POST /api/v1/news` - 뉴스 수집 및 저장
//!
//! 업스트림 실패는 상태 코드를 그대로 전파하고, 저장 실패는
//! `warning` 필드로만 전달됩니다.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use tracker_core::domain::fundamentals::FundamentalSnapshot;
use tracker_core::domain::news::NewsArticle;
use tracker_core::types::Ticker;

use crate::error::{
    client_not_configured, data_error, invalid_input, ApiErrorResponse, ApiResult,
};
use crate::repository::{SectionColumn, TickerSearchRepository};
use crate::state::AppState;

/// 티커만 담는 수집 요청 본문.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TickerRequest {
    /// 대상 티커
    pub ticker: Option<String>,
}

impl TickerRequest {
    /// 티커 존재 여부와 형식을 검증합니다.
    pub fn parse_ticker(&self) -> Result<Ticker, String> {
        let raw = self.ticker.as_deref().ok_or("티커가 필요합니다")?;
        Ticker::parse(raw).map_err(|e| e.to_string())
    }
}

/// 펀더멘털 수집 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct FundamentalsResponse {
    pub success: bool,
    pub ticker: String,
    /// 정규화된 스냅샷
    pub fundamental: FundamentalSnapshot,
    /// 저장 경고
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 뉴스 수집 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct NewsResponse {
    pub success: bool,
    pub ticker: String,
    /// 수집된 기사
    pub articles: Vec<NewsArticle>,
    pub articles_count: usize,
    /// 저장 경고
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 섹션 데이터를 저장하고, 실패 시 warning 문자열을 반환합니다.
pub(crate) async fn store_section(
    pool: Option<&PgPool>,
    ticker: &Ticker,
    section: SectionColumn,
    data: &serde_json::Value,
) -> Option<String> {
    match pool {
        Some(pool) => {
            match TickerSearchRepository::save_section(pool, ticker.as_str(), section, data).await
            {
                Ok(_) => None,
                Err(e) => {
                    warn!(ticker = %ticker, section = ?section, error = %e, "Failed to persist section data");
                    Some("수집 데이터를 저장하지 못했습니다".to_string())
                }
            }
        }
        None => Some("저장소 미설정: 수집 데이터가 저장되지 않았습니다".to_string()),
    }
}

/// 펀더멘털 수집 및 저장.
///
/// POST /api/v1/fundamentals
#[utoipa::path(
    post,
    path = "/api/v1/fundamentals",
    request_body = TickerRequest,
    responses(
        (status = 200, description = "수집된 펀더멘털", body = FundamentalsResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "EODHD 미설정", body = ApiErrorResponse)
    ),
    tag = "eodhd"
)]
pub async fn fetch_fundamentals(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TickerRequest>,
) -> ApiResult<Json<FundamentalsResponse>> {
    let ticker = request.parse_ticker().map_err(invalid_input)?;
    let eodhd = state
        .eodhd
        .as_ref()
        .ok_or_else(|| client_not_configured("EODHD"))?;

    let snapshot = eodhd
        .fetch_fundamentals(&ticker)
        .await
        .map_err(data_error)?;

    let payload = serde_json::to_value(&snapshot)
        .map_err(|e| crate::error::internal_error(e.to_string()))?;
    let warning = store_section(
        state.db_pool.as_ref(),
        &ticker,
        SectionColumn::Fundamental,
        &payload,
    )
    .await;

    info!(ticker = %ticker, "Fundamental data fetched");

    Ok(Json(FundamentalsResponse {
        success: true,
        ticker: ticker.to_string(),
        fundamental: snapshot,
        warning,
    }))
}

/// 뉴스 수집 및 저장.
///
/// POST /api/v1/news
#[utoipa::path(
    post,
    path = "/api/v1/news",
    request_body = TickerRequest,
    responses(
        (status = 200, description = "수집된 뉴스", body = NewsResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "EODHD 미설정", body = ApiErrorResponse)
    ),
    tag = "eodhd"
)]
pub async fn fetch_news(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TickerRequest>,
) -> ApiResult<Json<NewsResponse>> {
    let ticker = request.parse_ticker().map_err(invalid_input)?;
    let eodhd = state
        .eodhd
        .as_ref()
        .ok_or_else(|| client_not_configured("EODHD"))?;

    let articles = eodhd.fetch_news(&ticker).await.map_err(data_error)?;

    let payload = serde_json::to_value(&articles)
        .map_err(|e| crate::error::internal_error(e.to_string()))?;
    let warning = store_section(
        state.db_pool.as_ref(),
        &ticker,
        SectionColumn::News,
        &payload,
    )
    .await;

    info!(ticker = %ticker, count = articles.len(), "News data fetched");

    Ok(Json(NewsResponse {
        success: true,
        ticker: ticker.to_string(),
        articles_count: articles.len(),
        articles,
        warning,
    }))
}

/// EODHD 라우터 생성.
pub fn eodhd_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fundamentals", post(fetch_fundamentals))
        .route("/news", post(fetch_news))
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

    fn request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fundamentals_requires_ticker() {
        let app = eodhd_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(request("/fundamentals", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_news_without_client_returns_503() {
        let app = eodhd_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(request("/news", json!({ "ticker": "GME" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_fundamentals_fetch_and_warning_without_db() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/fundamentals/GME.US")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                json!({ "General": { "Name": "GameStop Corp" } }).to_string(),
            )
            .create_async()
            .await;

        let mut state = create_test_state();
        state.eodhd = Some(tracker_data::EodhdClient::with_base_url(
            "test-key",
            server.url(),
        ));

        let app = eodhd_router().with_state(Arc::new(state));
        let response = app
            .oneshot(request("/fundamentals", json!({ "ticker": "GME" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed["fundamental"]["name"], "GameStop Corp");
        assert!(parsed["warning"].is_string());
    }
}
