//! 티커 트래커 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 헬스 체크, Reddit 검색 집계, 수집 데이터 조회 등의 엔드포인트를
//! 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use tracker_api::openapi::swagger_ui_router;
use tracker_api::routes::create_api_router;
use tracker_api::state::AppState;
use tracker_core::TrackerConfig;

/// AppState 초기화.
///
/// DATABASE_URL이 설정된 경우 연결을 시도하고 `SELECT 1`로
/// 검증합니다. 연결 실패 시 저장 기능 없이 기동합니다.
async fn create_app_state(config: TrackerConfig) -> AppState {
    let database = config.database.clone();
    let mut state = AppState::new(config);

    if let Some(database_url) = &database.url {
        match PgPoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(database.acquire_timeout())
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                if sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok() {
                    info!("Connected to PostgreSQL successfully");
                    state = state.with_db_pool(pool);
                } else {
                    error!("Failed to verify database connection");
                }
            }
            Err(e) => {
                error!("Failed to connect to database: {}", e);
            }
        }
    } else {
        warn!("DATABASE_URL not set, persistence will be disabled");
    }

    state
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(create_api_router().with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 기타 미들웨어
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (120초) - 댓글 페이싱이 포함된 집계 요청 고려
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(120),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_api=info,tower_http=debug".into()),
        )
        .init();

    info!("Starting Ticker Tracker API server...");

    // 설정 로드
    let config = TrackerConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
            );
            e
        })?;

    // AppState 생성 (DB 연결 포함)
    let state = Arc::new(create_app_state(config).await);

    info!(version = %state.version, "Application state initialized");
    info!(
        has_db = state.has_db(),
        has_eodhd = state.eodhd.is_some(),
        has_roic = state.roic.is_some(),
        has_agents = state.agents.is_some(),
        "Service connections status"
    );

    // 라우터 생성
    let app = create_router(state);

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown 처리
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
