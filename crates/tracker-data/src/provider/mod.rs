//! 외부 데이터 소스 클라이언트.
//!
//! 모든 클라이언트는 base URL 교체를 지원하여 테스트에서
//! mock 서버를 가리킬 수 있습니다.

pub mod eodhd;
pub mod reddit;
pub mod roic;

pub use eodhd::EodhdClient;
pub use reddit::RedditClient;
pub use roic::RoicClient;
