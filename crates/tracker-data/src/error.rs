//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 수집 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 외부 API가 실패 상태 코드를 반환함
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// 데이터 가져오기 오류 (네트워크 계층)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 잘못된 데이터/입력
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return DataError::Timeout(err.to_string());
        }
        if err.is_decode() {
            return DataError::ParseError(err.to_string());
        }
        if let Some(status) = err.status() {
            return DataError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        DataError::FetchError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
