//! 환경변수 기반 설정 모듈.
//!
//! 모든 설정은 환경변수에서 로드되며, 섹션별 구조체로 구성됩니다.
//! `.env` 파일 로드는 바이너리 진입점에서 `dotenvy`로 수행합니다.

use std::time::Duration;

use crate::error::{TrackerError, TrackerResult};

/// 트래커 전체 설정.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// Reddit API 설정
    pub reddit: RedditConfig,
    /// EODHD API 설정
    pub eodhd: EodhdConfig,
    /// roic.ai API 설정
    pub roic: RoicConfig,
    /// AI 에이전트 설정
    pub agent: AgentConfig,
}

/// 서버 설정.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 바인딩할 호스트 주소
    pub host: String,
    /// 바인딩할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 데이터베이스 URL (없으면 저장 기능 비활성화)
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

impl DatabaseConfig {
    /// 연결 획득 타임아웃을 Duration으로 반환.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Reddit API 설정.
///
/// Reddit 공개 JSON API는 인증이 필요 없으며 User-Agent 헤더만 요구합니다.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    /// 요청에 사용할 User-Agent 헤더
    pub user_agent: String,
    /// 댓글 요청 간 최소 간격 (밀리초)
    pub comment_fetch_delay_ms: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            user_agent: "TickerTracker/0.1".to_string(),
            comment_fetch_delay_ms: 300,
        }
    }
}

impl RedditConfig {
    /// 댓글 요청 간 최소 간격을 Duration으로 반환.
    pub fn comment_fetch_delay(&self) -> Duration {
        Duration::from_millis(self.comment_fetch_delay_ms)
    }
}

/// EODHD API 설정.
#[derive(Debug, Clone, Default)]
pub struct EodhdConfig {
    /// API 토큰 (없으면 펀더멘털/뉴스 수집 비활성화)
    pub api_key: Option<String>,
}

/// roic.ai API 설정.
#[derive(Debug, Clone, Default)]
pub struct RoicConfig {
    /// API 키 (없으면 재무비율/실적발표 수집 비활성화)
    pub api_key: Option<String>,
}

/// AI 에이전트 설정.
///
/// OpenAI 호환 chat completions 엔드포인트를 사용합니다.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// API 키 (없으면 에이전트 기능 비활성화)
    pub api_key: Option<String>,
    /// 사용할 모델 이름
    pub model: String,
    /// API base URL
    pub base_url: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

impl TrackerConfig {
    /// 환경변수에서 설정 로드.
    ///
    /// # 환경변수
    ///
    /// - `API_HOST`, `API_PORT`: 서버 바인딩 주소 (기본: 127.0.0.1:3000)
    /// - `DATABASE_URL`: PostgreSQL 연결 문자열 (선택)
    /// - `DATABASE_MAX_CONNECTIONS`: 최대 연결 수 (기본: 10)
    /// - `REDDIT_USER_AGENT`: Reddit 요청 User-Agent (기본: TickerTracker/0.1)
    /// - `REDDIT_COMMENT_DELAY_MS`: 댓글 요청 간 최소 간격 (기본: 300)
    /// - `EODHD_API_KEY`: EODHD API 토큰 (선택)
    /// - `ROIC_API_KEY`: roic.ai API 키 (선택)
    /// - `AGENT_API_KEY`, `AGENT_MODEL`, `AGENT_BASE_URL`: 에이전트 설정 (선택)
    pub fn from_env() -> TrackerResult<Self> {
        let port = env_var_parse("API_PORT", 3000u16);
        if port == 0 {
            return Err(TrackerError::Config(
                "API_PORT는 0이 될 수 없습니다".to_string(),
            ));
        }

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").ok(),
                max_connections: env_var_parse("DATABASE_MAX_CONNECTIONS", 10),
                acquire_timeout_secs: env_var_parse("DATABASE_ACQUIRE_TIMEOUT_SECS", 10),
            },
            reddit: RedditConfig {
                user_agent: std::env::var("REDDIT_USER_AGENT")
                    .unwrap_or_else(|_| "TickerTracker/0.1".to_string()),
                comment_fetch_delay_ms: env_var_parse("REDDIT_COMMENT_DELAY_MS", 300),
            },
            eodhd: EodhdConfig {
                api_key: std::env::var("EODHD_API_KEY").ok(),
            },
            roic: RoicConfig {
                api_key: std::env::var("ROIC_API_KEY").ok(),
            },
            agent: AgentConfig {
                api_key: std::env::var("AGENT_API_KEY").ok(),
                model: std::env::var("AGENT_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                base_url: std::env::var("AGENT_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            },
        })
    }
}

/// 환경변수를 파싱하고 실패 시 기본값을 반환.
fn env_var_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
