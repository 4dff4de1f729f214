//! 실적발표 수집 API 엔드포인트.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/earnings/calls` - 실적발표 목록 수집 및 저장
//! - `POST /api/v1/earnings/transcript` - 녹취록 조회 (30일 캐시)
//! - `POST /api/v1/earnings/transcripts/check` - 저장된 녹취록 목록
//!
//! 녹취록은 `(ticker, year, quarter)`로 캐시되며, 30일 이내의
//! 캐시는 업스트림 재조회 없이 반환됩니다 (`from_cache: true`).
//! 캐시 저장 실패는 호출을 실패시키지 않고 `warning`으로 전달됩니다.

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use tracker_core::domain::earnings::{EarningsCall, Quarter};
use tracker_core::types::Ticker;

use crate::error::{
    client_not_configured, data_error, db_not_configured, db_error, invalid_input,
    ApiErrorResponse, ApiResult,
};
use crate::repository::{SectionColumn, TranscriptRepository};
use crate::routes::eodhd::{store_section, TickerRequest};
use crate::state::AppState;

/// 실적발표 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct EarningsCallsResponse {
    pub success: bool,
    pub ticker: String,
    pub earnings_calls: Vec<EarningsCall>,
    pub count: usize,
    /// 저장 경고
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 녹취록 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranscriptRequest {
    pub ticker: Option<String>,
    pub year: Option<i32>,
    pub quarter: Option<i32>,
}

/// 녹취록 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptResponse {
    pub success: bool,
    pub ticker: String,
    pub year: i32,
    pub quarter: i32,
    /// 녹취록 본문 (업스트림 스키마 그대로)
    pub transcript: Value,
    /// 캐시에서 반환되었는지 여부
    pub from_cache: bool,
    /// 캐시 저장 시각
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    /// 캐시 저장 실패 경고
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 저장된 녹취록 확인 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranscriptsCheckRequest {
    pub ticker: Option<String>,
    /// 확인 대상 실적발표 목록
    pub earnings_calls: Option<Vec<EarningsCall>>,
}

/// 저장된 녹취록 확인 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptsCheckResponse {
    pub success: bool,
    pub ticker: String,
    /// "{year}-{quarter}" → 녹취록 본문
    pub transcripts: BTreeMap<String, Value>,
}

/// 실적발표 목록 수집 및 저장.
///
/// POST /api/v1/earnings/calls
#[utoipa::path(
    post,
    path = "/api/v1/earnings/calls",
    request_body = TickerRequest,
    responses(
        (status = 200, description = "실적발표 목록", body = EarningsCallsResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "roic.ai 미설정", body = ApiErrorResponse)
    ),
    tag = "earnings"
)]
pub async fn fetch_earnings_calls(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TickerRequest>,
) -> ApiResult<Json<EarningsCallsResponse>> {
    let ticker = request.parse_ticker().map_err(invalid_input)?;
    let roic = state
        .roic
        .as_ref()
        .ok_or_else(|| client_not_configured("roic.ai"))?;

    let calls = roic.fetch_earnings_calls(&ticker).await.map_err(data_error)?;

    let payload = serde_json::to_value(&calls)
        .map_err(|e| crate::error::internal_error(e.to_string()))?;
    let warning = store_section(
        state.db_pool.as_ref(),
        &ticker,
        SectionColumn::EarningsCalls,
        &payload,
    )
    .await;

    info!(ticker = %ticker, count = calls.len(), "Earnings calls fetched");

    Ok(Json(EarningsCallsResponse {
        success: true,
        ticker: ticker.to_string(),
        count: calls.len(),
        earnings_calls: calls,
        warning,
    }))
}

/// 녹취록 조회 (30일 캐시).
///
/// POST /api/v1/earnings/transcript
#[utoipa::path(
    post,
    path = "/api/v1/earnings/transcript",
    request_body = TranscriptRequest,
    responses(
        (status = 200, description = "녹취록", body = TranscriptResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 503, description = "roic.ai 미설정", body = ApiErrorResponse)
    ),
    tag = "earnings"
)]
pub async fn fetch_transcript(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranscriptRequest>,
) -> ApiResult<Json<TranscriptResponse>> {
    let raw_ticker = request
        .ticker
        .as_deref()
        .ok_or_else(|| invalid_input("티커가 필요합니다"))?;
    let ticker = Ticker::parse(raw_ticker).map_err(|e| invalid_input(e.to_string()))?;
    let (year, raw_quarter) = match (request.year, request.quarter) {
        (Some(year), Some(quarter)) => (year, quarter),
        _ => return Err(invalid_input("연도와 분기가 필요합니다")),
    };
    let quarter = Quarter::new(raw_quarter).map_err(|e| invalid_input(e.to_string()))?;

    // 1. 신선한 캐시가 있으면 업스트림 호출 생략
    if let Some(pool) = &state.db_pool {
        let cached = TranscriptRepository::find(pool, ticker.as_str(), year, quarter.value())
            .await
            .map_err(db_error)?;

        if let Some(record) = cached {
            if record.is_fresh(Utc::now()) {
                return Ok(Json(TranscriptResponse {
                    success: true,
                    ticker: ticker.to_string(),
                    year,
                    quarter: quarter.value(),
                    transcript: record.transcript_data,
                    from_cache: true,
                    cached_at: Some(record.created_at),
                    warning: None,
                }));
            }
        }
    }

    // 2. 업스트림에서 조회
    let roic = state
        .roic
        .as_ref()
        .ok_or_else(|| client_not_configured("roic.ai"))?;
    let transcript = roic
        .fetch_transcript(&ticker, year, quarter)
        .await
        .map_err(data_error)?;

    // 3. 캐시에 upsert. 실패해도 데이터는 반환
    let (cached_at, warning) = match &state.db_pool {
        Some(pool) => {
            match TranscriptRepository::upsert(
                pool,
                ticker.as_str(),
                year,
                quarter.value(),
                &transcript,
            )
            .await
            {
                Ok(record) => (Some(record.created_at), None),
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "Failed to cache transcript");
                    (
                        None,
                        Some("녹취록을 캐시에 저장하지 못했습니다".to_string()),
                    )
                }
            }
        }
        None => (
            None,
            Some("저장소 미설정: 녹취록이 캐시되지 않았습니다".to_string()),
        ),
    };

    Ok(Json(TranscriptResponse {
        success: true,
        ticker: ticker.to_string(),
        year,
        quarter: quarter.value(),
        transcript,
        from_cache: false,
        cached_at,
        warning,
    }))
}

/// 저장된 녹취록 확인.
///
/// POST /api/v1/earnings/transcripts/check
#[utoipa::path(
    post,
    path = "/api/v1/earnings/transcripts/check",
    request_body = TranscriptsCheckRequest,
    responses(
        (status = 200, description = "저장된 녹취록 맵", body = TranscriptsCheckResponse),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse)
    ),
    tag = "earnings"
)]
pub async fn check_transcripts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranscriptsCheckRequest>,
) -> ApiResult<Json<TranscriptsCheckResponse>> {
    let raw_ticker = request
        .ticker
        .as_deref()
        .ok_or_else(|| invalid_input("티커가 필요합니다"))?;
    let ticker = Ticker::parse(raw_ticker).map_err(|e| invalid_input(e.to_string()))?;
    if request.earnings_calls.is_none() {
        return Err(invalid_input("실적발표 목록이 필요합니다"));
    }
    let pool = state.db_pool.as_ref().ok_or_else(db_not_configured)?;

    let records = TranscriptRepository::list_for_ticker(pool, ticker.as_str())
        .await
        .map_err(db_error)?;

    let transcripts: BTreeMap<String, Value> = records
        .into_iter()
        .map(|record| {
            (
                format!("{}-{}", record.year, record.quarter),
                record.transcript_data,
            )
        })
        .collect();

    Ok(Json(TranscriptsCheckResponse {
        success: true,
        ticker: ticker.to_string(),
        transcripts,
    }))
}

/// 실적발표 라우터 생성.
pub fn earnings_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/calls", post(fetch_earnings_calls))
        .route("/transcript", post(fetch_transcript))
        .route("/transcripts/check", post(check_transcripts))
}
