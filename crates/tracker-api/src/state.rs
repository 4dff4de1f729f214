//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 설정, 데이터베이스 풀, 외부 API 클라이언트를 묶어
//! Arc로 래핑된 채 Axum의 State extractor로 핸들러에 주입됩니다.
//!
//! 데이터베이스와 API 키는 모두 선택적입니다. 미설정 시 해당
//! 기능을 쓰는 엔드포인트만 503을 반환하고 서버는 동작합니다.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tracker_agents::ChatClient;
use tracker_core::TrackerConfig;
use tracker_data::{EodhdClient, RedditClient, RoicClient};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 전체 설정
    pub config: TrackerConfig,

    /// 데이터베이스 연결 풀 (DATABASE_URL 설정 시)
    pub db_pool: Option<PgPool>,

    /// Reddit 공개 API 클라이언트 (항상 사용 가능)
    pub reddit: RedditClient,

    /// EODHD 클라이언트 (EODHD_API_KEY 설정 시)
    pub eodhd: Option<EodhdClient>,

    /// roic.ai 클라이언트 (ROIC_API_KEY 설정 시)
    pub roic: Option<RoicClient>,

    /// AI 에이전트 클라이언트 (AGENT_API_KEY 설정 시)
    pub agents: Option<ChatClient>,

    /// API 버전
    pub version: String,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 설정에서 상태를 생성합니다. DB 연결은 별도로 주입합니다.
    pub fn new(config: TrackerConfig) -> Self {
        let reddit = RedditClient::new(&config.reddit.user_agent);
        let eodhd = config
            .eodhd
            .api_key
            .as_deref()
            .map(EodhdClient::new);
        let roic = config.roic.api_key.as_deref().map(RoicClient::new);
        let agents = config.agent.api_key.as_deref().map(|key| {
            ChatClient::new(key, &config.agent.model, &config.agent.base_url)
        });

        Self {
            config,
            db_pool: None,
            reddit,
            eodhd,
            roic,
            agents,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    /// 데이터베이스 풀을 연결합니다.
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 데이터베이스 설정 여부.
    pub fn has_db(&self) -> bool {
        self.db_pool.is_some()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => false,
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 생성.
///
/// DB와 외부 API 키 없이 기본 설정으로 구성됩니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let config = TrackerConfig {
        server: Default::default(),
        database: Default::default(),
        reddit: Default::default(),
        eodhd: Default::default(),
        roic: Default::default(),
        agent: Default::default(),
    };
    AppState::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_without_keys_has_no_clients() {
        let state = create_test_state();

        assert!(!state.has_db());
        assert!(state.eodhd.is_none());
        assert!(state.roic.is_none());
        assert!(state.agents.is_none());
        assert!(!state.version.is_empty());
    }

    #[tokio::test]
    async fn test_db_health_without_pool() {
        let state = create_test_state();
        assert!(!state.is_db_healthy().await);
    }
}
