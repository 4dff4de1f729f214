//! 실적발표 도메인 타입.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TrackerError, TrackerResult};

/// 실적발표(earnings call) 목록 항목.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct EarningsCall {
    /// 심볼
    pub symbol: Option<String>,
    /// 회계연도
    pub year: Option<i32>,
    /// 분기 (1-4)
    pub quarter: Option<i32>,
    /// 발표 일자 (원문 형식)
    pub date: Option<String>,
}

impl EarningsCall {
    /// roic.ai 목록 응답의 항목 하나를 변환합니다.
    pub fn from_roic(raw: &Value) -> Self {
        Self {
            symbol: raw["symbol"].as_str().map(str::to_string),
            year: raw["year"].as_i64().map(|y| y as i32),
            quarter: raw["quarter"].as_i64().map(|q| q as i32),
            date: raw["date"].as_str().map(str::to_string),
        }
    }
}

/// 검증된 분기 값 (1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct Quarter(i32);

impl Quarter {
    /// 분기 값을 검증하고 생성합니다.
    ///
    /// # Errors
    /// 1-4 범위를 벗어나면 `TrackerError::InvalidInput`을 반환합니다.
    pub fn new(value: i32) -> TrackerResult<Self> {
        if !(1..=4).contains(&value) {
            return Err(TrackerError::InvalidInput(format!(
                "분기는 1-4 사이여야 합니다: {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// 분기 값 반환.
    pub fn value(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quarter_bounds() {
        assert!(Quarter::new(1).is_ok());
        assert!(Quarter::new(4).is_ok());
        assert!(Quarter::new(0).is_err());
        assert!(Quarter::new(5).is_err());
    }

    #[test]
    fn test_earnings_call_from_roic() {
        let raw = json!({ "symbol": "GME", "year": 2025, "quarter": 1, "date": "2025-03-26" });
        let call = EarningsCall::from_roic(&raw);

        assert_eq!(call.symbol.as_deref(), Some("GME"));
        assert_eq!(call.quarter, Some(1));
    }

    #[test]
    fn test_earnings_call_tolerates_nulls() {
        let call = EarningsCall::from_roic(&json!({ "symbol": null }));
        assert!(call.symbol.is_none());
        assert!(call.year.is_none());
    }
}
