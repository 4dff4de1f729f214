//! 티커 심볼 정의.
//!
//! 이 모듈은 종목을 식별하는 `Ticker` 타입을 정의합니다.
//! 모든 저장/조회 경로는 대문자로 정규화된 티커를 키로 사용합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{TrackerError, TrackerResult};

/// 주식 거래소 티커 심볼.
///
/// 생성 시 공백 제거 및 대문자 정규화를 수행합니다.
/// 예: " gme " → "GME", "brk.b" → "BRK.B"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// 입력 문자열을 검증하고 티커를 생성합니다.
    ///
    /// # Errors
    /// 빈 문자열이거나 허용되지 않는 문자가 포함되면
    /// `TrackerError::InvalidInput`을 반환합니다.
    pub fn parse(raw: &str) -> TrackerResult<Self> {
        let normalized = raw.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(TrackerError::InvalidInput(
                "티커가 비어 있습니다".to_string(),
            ));
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(TrackerError::InvalidInput(format!(
                "유효하지 않은 티커: {}",
                raw
            )));
        }

        Ok(Self(normalized))
    }

    /// 티커 문자열 반환.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// EODHD용 거래소 코드가 붙은 심볼 반환 (예: "AAPL.US").
    pub fn with_us_exchange(&self) -> String {
        format!("{}.US", self.0)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        let ticker = Ticker::parse(" gme ").unwrap();
        assert_eq!(ticker.as_str(), "GME");

        let ticker = Ticker::parse("brk.b").unwrap();
        assert_eq!(ticker.as_str(), "BRK.B");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Ticker::parse("").is_err());
        assert!(Ticker::parse("   ").is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_chars() {
        assert!(Ticker::parse("GME; DROP TABLE").is_err());
        assert!(Ticker::parse("A/B").is_err());
    }

    #[test]
    fn test_us_exchange_suffix() {
        let ticker = Ticker::parse("aapl").unwrap();
        assert_eq!(ticker.with_us_exchange(), "AAPL.US");
    }
}
