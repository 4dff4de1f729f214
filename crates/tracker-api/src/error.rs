//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//!
//! # 에러 분류
//!
//! - 입력 검증 실패 → 400 `INVALID_INPUT` (네트워크/저장소 접근 전에 반환)
//! - 외부 API 실패 → 업스트림 상태 코드 전파
//! - 저장소 미설정 → 503 `DB_NOT_CONFIGURED`
//! - 그 외 → 500 `INTERNAL_ERROR`
//!
//! 저장 실패는 수집 응답을 실패시키지 않고 `warning` 필드로
//! 전달됩니다 (해당 응답 타입 참조).

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use tracker_data::DataError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INVALID_INPUT",
///   "message": "티커가 비어 있습니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_ERROR", "INVALID_INPUT", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 400 입력 검증 에러.
pub fn invalid_input(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("INVALID_INPUT", message)),
    )
}

/// 404 에러.
pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::new("NOT_FOUND", message)),
    )
}

/// 500 내부 에러.
pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new("INTERNAL_ERROR", message)),
    )
}

/// 503 데이터베이스 미설정 에러.
pub fn db_not_configured() -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiErrorResponse::new(
            "DB_NOT_CONFIGURED",
            "데이터베이스가 설정되지 않았습니다 (DATABASE_URL)",
        )),
    )
}

/// 503 외부 API 클라이언트 미설정 에러.
pub fn client_not_configured(name: &str) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiErrorResponse::new(
            "CLIENT_NOT_CONFIGURED",
            format!("{} API가 설정되지 않았습니다", name),
        )),
    )
}

/// 데이터베이스 에러를 500 응답으로 변환.
pub fn db_error(err: sqlx::Error) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new("DB_ERROR", err.to_string())),
    )
}

/// 데이터 수집 에러를 응답으로 변환.
///
/// 업스트림 상태 코드는 원본 endpoint들의 동작대로 그대로
/// 전파하고, 나머지는 502로 취급합니다.
pub fn data_error(err: DataError) -> (StatusCode, Json<ApiErrorResponse>) {
    match err {
        DataError::Upstream { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ApiErrorResponse::new("UPSTREAM_ERROR", message)),
        ),
        DataError::InvalidData(message) => invalid_input(message),
        DataError::Timeout(message) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(ApiErrorResponse::new("UPSTREAM_TIMEOUT", message)),
        ),
        other => (
            StatusCode::BAD_GATEWAY,
            Json(ApiErrorResponse::new("FETCH_ERROR", other.to_string())),
        ),
    }
}

/// 에이전트 에러를 응답으로 변환.
///
/// 업스트림 LLM API의 상태 코드는 그대로 전파합니다.
pub fn agent_error(err: tracker_agents::AgentError) -> (StatusCode, Json<ApiErrorResponse>) {
    match err {
        tracker_agents::AgentError::Api { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ApiErrorResponse::new("AGENT_API_ERROR", message)),
        ),
        other => (
            StatusCode::BAD_GATEWAY,
            Json(ApiErrorResponse::new("AGENT_ERROR", other.to_string())),
        ),
    }
}
