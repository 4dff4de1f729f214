//! 에이전트 모듈 오류 타입.

use thiserror::Error;

/// 에이전트 실행 오류.
#[derive(Debug, Error)]
pub enum AgentError {
    /// API가 실패 상태 코드를 반환함
    #[error("Agent API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 네트워크 오류
    #[error("Network error: {0}")]
    Network(String),

    /// 응답이 기대한 출력 스키마와 일치하지 않음
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// 응답에 선택지가 없음
    #[error("Empty completion")]
    EmptyCompletion,

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
