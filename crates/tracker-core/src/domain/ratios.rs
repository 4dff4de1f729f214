//! 재무비율 데이터 타입.
//!
//! roic.ai 비율 응답은 스키마가 업스트림 소유이므로 행을 그대로
//! 통과시키고, 연간/분기 묶음과 종류 구분만 타입으로 표현합니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 비율 종류. 업스트림 URL 경로 세그먼트를 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    /// 유동성 비율
    Liquidity,
    /// 신용 비율
    Credit,
}

impl RatioKind {
    /// 업스트림 경로 세그먼트 반환.
    pub fn path(&self) -> &'static str {
        match self {
            RatioKind::Liquidity => "liquidity",
            RatioKind::Credit => "credit",
        }
    }
}

/// 연간/분기 비율 묶음. 행 스키마는 업스트림 그대로입니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct RatioBundle {
    /// 연간 비율 행
    pub annual: Vec<Value>,
    /// 분기 비율 행
    pub quarterly: Vec<Value>,
}

impl RatioBundle {
    /// 배열이 아닌 payload를 빈 목록으로 정규화하며 묶음을 생성합니다.
    pub fn from_raw(annual: Value, quarterly: Value) -> Self {
        let rows = |v: Value| match v {
            Value::Array(items) => items,
            _ => Vec::new(),
        };

        Self {
            annual: rows(annual),
            quarterly: rows(quarterly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_path() {
        assert_eq!(RatioKind::Liquidity.path(), "liquidity");
        assert_eq!(RatioKind::Credit.path(), "credit");
    }

    #[test]
    fn test_bundle_normalizes_non_array() {
        let bundle = RatioBundle::from_raw(json!([{ "currentRatio": 1.2 }]), json!({ "error": "x" }));

        assert_eq!(bundle.annual.len(), 1);
        assert!(bundle.quarterly.is_empty());
    }
}
