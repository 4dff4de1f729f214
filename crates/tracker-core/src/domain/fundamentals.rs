//! 펀더멘털 데이터 정규화.
//!
//! EODHD fundamentals 응답을 정규화된 스냅샷으로 변환합니다.
//! 변환 규칙:
//! - `"NA"`, 빈 문자열, null → None
//! - 숫자 문자열 → 숫자로 파싱
//! - 재무제표는 최근 5개 연도만 유지, 기간 내림차순 정렬
//!
//! 모든 변환은 순수 함수이며 네트워크 호출을 포함하지 않습니다.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 정규화된 펀더멘털 스냅샷.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct FundamentalSnapshot {
    /// 회사명
    pub name: Option<String>,
    /// 종목 코드
    pub code: Option<String>,
    /// 섹터
    pub sector: Option<String>,
    /// 회사 설명
    pub description: Option<String>,
    /// 핵심 지표
    pub highlights: Highlights,
    /// 재무제표 (최근 5개 연도)
    pub financials: Financials,
}

/// 핵심 지표 모음.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Highlights {
    // 시장 데이터
    pub market_cap: Option<Decimal>,
    pub wallstreet_target_price: Option<Decimal>,
    pub book_value: Option<Decimal>,

    // 밸류에이션
    pub pe_ratio: Option<Decimal>,
    pub peg_ratio: Option<Decimal>,

    // 배당
    pub dividend_yield: Option<Decimal>,

    // 주당 지표
    pub earnings_share: Option<Decimal>,
    pub eps_estimate_current_year: Option<Decimal>,
    pub eps_estimate_next_year: Option<Decimal>,

    // 수익성 지표
    pub profit_margin: Option<Decimal>,
    pub operating_margin_ttm: Option<Decimal>,
    pub return_on_assets_ttm: Option<Decimal>,
    pub return_on_equity_ttm: Option<Decimal>,

    // 매출
    pub revenue_ttm: Option<Decimal>,
    pub revenue_per_share_ttm: Option<Decimal>,
    pub quarterly_revenue_growth_yoy: Option<Decimal>,
    pub quarterly_earnings_growth_yoy: Option<Decimal>,
    pub gross_profit_ttm: Option<Decimal>,
}

/// 재무제표 묶음.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Financials {
    /// 재무상태표
    pub balance_sheet: StatementSeries,
    /// 현금흐름표
    pub cash_flow: StatementSeries,
    /// 손익계산서
    pub income_statement: StatementSeries,
}

/// 분기/연간 시계열.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct StatementSeries {
    /// 분기 데이터 (기간 내림차순)
    pub quarterly: Vec<StatementPeriod>,
    /// 연간 데이터 (기간 내림차순)
    pub yearly: Vec<StatementPeriod>,
}

/// 한 기간의 재무제표 항목.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct StatementPeriod {
    /// 기간 키 (YYYY-MM-DD 또는 YYYY)
    pub period: String,
    /// 정규화된 항목 값
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

/// 재무 값 하나를 정규화합니다.
///
/// `"NA"`, 빈 문자열, null은 None으로, 숫자 문자열은 숫자로 바꿉니다.
pub fn clean_financial_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.is_empty() || s == "NA" {
                return None;
            }
            match s.parse::<f64>() {
                Ok(n) => serde_json::Number::from_f64(n).map(Value::Number),
                Err(_) => Some(Value::String(s.clone())),
            }
        }
        other => Some(other.clone()),
    }
}

/// 재무 값을 Decimal로 정규화합니다. 숫자가 아니면 None.
pub fn clean_decimal_value(value: &Value) -> Option<Decimal> {
    match clean_financial_value(value)? {
        Value::Number(n) => n
            .as_f64()
            .and_then(Decimal::from_f64)
            .or_else(|| n.to_string().parse().ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// 기간 키가 달린 객체 맵에서 최근 5개 연도만 추려 배열로 변환합니다.
///
/// 키는 `YYYY-MM-DD` 또는 `YYYY` 형식이어야 하며, 결과는 기간
/// 내림차순으로 정렬됩니다.
pub fn filter_past_five_years(data: &Value, current_year: i32) -> Vec<StatementPeriod> {
    let Some(map) = data.as_object() else {
        return Vec::new();
    };
    let five_years_ago = current_year - 5;

    let mut periods: Vec<StatementPeriod> = map
        .iter()
        .filter_map(|(key, entry)| {
            let year: i32 = key.get(..4)?.parse().ok()?;
            if year < five_years_ago || year > current_year {
                return None;
            }

            let obj = entry.as_object()?;
            let values: BTreeMap<String, Value> = obj
                .iter()
                .map(|(k, v)| {
                    (
                        k.clone(),
                        clean_financial_value(v).unwrap_or(Value::Null),
                    )
                })
                .collect();

            Some(StatementPeriod {
                period: key.clone(),
                values,
            })
        })
        .collect();

    periods.sort_by(|a, b| b.period.cmp(&a.period));
    periods
}

impl FundamentalSnapshot {
    /// EODHD fundamentals 원본 응답에서 스냅샷을 추출합니다.
    pub fn from_eodhd(raw: &Value, current_year: i32) -> Self {
        let general = &raw["General"];
        let highlights = &raw["Highlights"];
        let financials = &raw["Financials"];

        let series = |section: &str| StatementSeries {
            quarterly: filter_past_five_years(&financials[section]["quarterly"], current_year),
            yearly: filter_past_five_years(&financials[section]["yearly"], current_year),
        };

        Self {
            name: general["Name"].as_str().map(str::to_string),
            code: general["Code"].as_str().map(str::to_string),
            sector: general["Sector"].as_str().map(str::to_string),
            description: general["Description"].as_str().map(str::to_string),
            highlights: Highlights {
                market_cap: clean_decimal_value(&highlights["MarketCapitalization"]),
                wallstreet_target_price: clean_decimal_value(&highlights["WallStreetTargetPrice"]),
                book_value: clean_decimal_value(&highlights["BookValue"]),
                pe_ratio: clean_decimal_value(&highlights["PERatio"]),
                peg_ratio: clean_decimal_value(&highlights["PEGRatio"]),
                dividend_yield: clean_decimal_value(&highlights["DividendYield"]),
                earnings_share: clean_decimal_value(&highlights["EarningsShare"]),
                eps_estimate_current_year: clean_decimal_value(
                    &highlights["EPSEstimateCurrentYear"],
                ),
                eps_estimate_next_year: clean_decimal_value(&highlights["EPSEstimateNextYear"]),
                profit_margin: clean_decimal_value(&highlights["ProfitMargin"]),
                operating_margin_ttm: clean_decimal_value(&highlights["OperatingMarginTTM"]),
                return_on_assets_ttm: clean_decimal_value(&highlights["ReturnOnAssetsTTM"]),
                return_on_equity_ttm: clean_decimal_value(&highlights["ReturnOnEquityTTM"]),
                revenue_ttm: clean_decimal_value(&highlights["RevenueTTM"]),
                revenue_per_share_ttm: clean_decimal_value(&highlights["RevenuePerShareTTM"]),
                quarterly_revenue_growth_yoy: clean_decimal_value(
                    &highlights["QuarterlyRevenueGrowthYOY"],
                ),
                quarterly_earnings_growth_yoy: clean_decimal_value(
                    &highlights["QuarterlyEarningsGrowthYOY"],
                ),
                gross_profit_ttm: clean_decimal_value(&highlights["GrossProfitTTM"]),
            },
            financials: Financials {
                balance_sheet: series("Balance_Sheet"),
                cash_flow: series("Cash_Flow"),
                income_statement: series("Income_Statement"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_value_na_and_empty() {
        assert_eq!(clean_financial_value(&json!("NA")), None);
        assert_eq!(clean_financial_value(&json!("")), None);
        assert_eq!(clean_financial_value(&Value::Null), None);
    }

    #[test]
    fn test_clean_value_numeric_string() {
        let cleaned = clean_financial_value(&json!("12.5")).unwrap();
        assert_eq!(cleaned, json!(12.5));

        // 숫자가 아닌 문자열은 그대로
        let kept = clean_financial_value(&json!("Technology")).unwrap();
        assert_eq!(kept, json!("Technology"));
    }

    #[test]
    fn test_clean_decimal_value() {
        assert_eq!(clean_decimal_value(&json!("3.14")).unwrap().to_string(), "3.14");
        assert!(clean_decimal_value(&json!(42)).is_some());
        assert_eq!(clean_decimal_value(&json!("NA")), None);
        assert_eq!(clean_decimal_value(&json!("Technology")), None);
    }

    #[test]
    fn test_five_year_filter_and_order() {
        let data = json!({
            "2025-03-31": { "totalAssets": "100" },
            "2022-12-31": { "totalAssets": "80" },
            "2018-12-31": { "totalAssets": "50" },
            "garbage": { "totalAssets": "1" }
        });

        let periods = filter_past_five_years(&data, 2025);

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].period, "2025-03-31");
        assert_eq!(periods[1].period, "2022-12-31");
        assert_eq!(periods[0].values["totalAssets"], json!(100.0));
    }

    #[test]
    fn test_snapshot_from_eodhd() {
        let raw = json!({
            "General": {
                "Name": "GameStop Corp",
                "Code": "GME",
                "Sector": "Consumer Cyclical",
                "Description": "Video game retailer."
            },
            "Highlights": {
                "MarketCapitalization": 10_000_000_000u64,
                "PERatio": "NA",
                "DividendYield": "0.015"
            },
            "Financials": {
                "Balance_Sheet": {
                    "yearly": { "2024-12-31": { "totalAssets": "3000" } },
                    "quarterly": {}
                }
            }
        });

        let snapshot = FundamentalSnapshot::from_eodhd(&raw, 2025);

        assert_eq!(snapshot.name.as_deref(), Some("GameStop Corp"));
        assert!(snapshot.highlights.pe_ratio.is_none());
        assert!(snapshot.highlights.dividend_yield.is_some());
        assert_eq!(snapshot.financials.balance_sheet.yearly.len(), 1);
        assert!(snapshot.financials.income_statement.yearly.is_empty());
    }
}
