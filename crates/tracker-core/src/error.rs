//! 티커 트래커의 에러 타입.
//!
//! 이 모듈은 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 트래커 에러.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 외부 API 에러 (상태 코드 포함)
    #[error("외부 API 에러 ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과: {0}")]
    RateLimit(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 트래커 작업을 위한 Result 타입.
pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrackerError::Network(_) | TrackerError::RateLimit(_)
        )
    }

    /// 클라이언트 입력 문제로 발생한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidInput(_) | TrackerError::NotFound(_)
        )
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}
