//! 재무비율 수집 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/ratios/liquidity` - 유동성 비율 수집 및 저장
//! - `POST /api/v1/ratios/credit` - 신용 비율 수집 및 저장
//!
//! 두 엔드포인트는 종류만 다르고 같은 흐름을 공유합니다:
//! 연간 + 분기 비율을 조회하고 티커 레코드의 섹션 컬럼에 저장합니다.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use tracker_core::domain::ratios::RatioKind;

use crate::error::{client_not_configured, data_error, invalid_input, ApiErrorResponse, ApiResult};
use crate::repository::SectionColumn;
use crate::routes::eodhd::{store_section, TickerRequest};
use crate::state::AppState;

/// 비율 수집 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct RatiosResponse {
    pub success: bool,
    pub ticker: String,
    /// 연간 비율 행
    pub annual: Vec<Value>,
    /// 분기 비율 행
    pub quarterly: Vec<Value>,
    pub annual_count: usize,
    pub quarterly_count: usize,
    /// 저장 경고
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 비율 종류 공통 처리.
async fn fetch_ratios(
    state: Arc<AppState>,
    request: TickerRequest,
    kind: RatioKind,
) -> ApiResult<Json<RatiosResponse>> {
    let ticker = request.parse_ticker().map_err(invalid_input)?;
    let roic = state
        .roic
        .as_ref()
        .ok_or_else(|| client_not_configured("roic.ai"))?;

    let bundle = roic
        .fetch_ratio_bundle(&ticker, kind)
        .await
        .map_err(data_error)?;

    let section = match kind {
        RatioKind::Liquidity => SectionColumn::LiquidityRatios,
        RatioKind::Credit => SectionColumn::CreditRatios,
    };
    let payload = serde_json::to_value(&bundle)
        .map_err(|e| crate::error::internal_error(e.to_string()))?;
    let warning = store_section(state.db_pool.as_ref(), &ticker, section, &payload).await;

    info!(
        ticker = %ticker,
        kind = ?kind,
        annual = bundle.annual.len(),
        quarterly = bundle.quarterly.len(),
        "Ratio data fetched"
    );

    Ok(Json(RatiosResponse {
        success: true,
        ticker: ticker.to_string(),
        annual_count: bundle.annual.len(),
        quarterly_count: bundle.quarterly.len(),
        annual: bundle.annual,
        quarterly: bundle.quarterly,
        warning,
    }))
}

/// 유동성 비율 수집.
///
/// POST /api/v1/ratios/liquidity
#[utoipa::path(
    post,
    path = "/api/v1/ratios/liquidity",
    request_body = TickerRequest,
    responses(
        (status = 200, description = "유동성 비율", body = RatiosResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "roic.ai 미설정", body = ApiErrorResponse)
    ),
    tag = "ratios"
)]
pub async fn fetch_liquidity_ratios(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TickerRequest>,
) -> ApiResult<Json<RatiosResponse>> {
    fetch_ratios(state, request, RatioKind::Liquidity).await
}

/// 신용 비율 수집.
///
/// POST /api/v1/ratios/credit
#[utoipa::path(
    post,
    path = "/api/v1/ratios/credit",
    request_body = TickerRequest,
    responses(
        (status = 200, description = "신용 비율", body = RatiosResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "roic.ai 미설정", body = ApiErrorResponse)
    ),
    tag = "ratios"
)]
pub async fn fetch_credit_ratios(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TickerRequest>,
) -> ApiResult<Json<RatiosResponse>> {
    fetch_ratios(state, request, RatioKind::Credit).await
}

/// 비율 라우터 생성.
pub fn ratios_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/liquidity", post(fetch_liquidity_ratios))
        .route("/credit", post(fetch_credit_ratios))
}
