//! REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 티커별 수집 데이터 저장소 (PostgreSQL)
//! - 헬스 체크 엔드포인트
//! - OpenAPI 문서 및 Swagger UI
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`repository`]: 데이터베이스 저장소
//! - [`error`]: 통합 API 에러 응답
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod error;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
