//! roic.ai 클라이언트.
//!
//! 재무비율(유동성/신용)과 실적발표 목록/녹취록을 수집합니다.
//!
//! ## 데이터 소스
//! - `/v2/fundamental/ratios/{liquidity|credit}/{ticker}`: 최근 5개
//!   회계연도 비율 (연간/분기, 내림차순)
//! - `/v2/company/earnings-calls/list/{ticker}`: 실적발표 목록
//! - `/v2/company/earnings-calls/transcript/{ticker}`: 녹취록

use chrono::{Datelike, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use tracker_core::domain::earnings::{EarningsCall, Quarter};
use tracker_core::domain::ratios::{RatioBundle, RatioKind};
use tracker_core::types::Ticker;

use crate::error::{DataError, Result};

const ROIC_BASE_URL: &str = "https://api.roic.ai";

/// 비율 조회가 거슬러 올라가는 회계연도 수.
const FISCAL_YEARS_BACK: i32 = 5;

/// roic.ai API 클라이언트.
#[derive(Debug, Clone)]
pub struct RoicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl RoicClient {
    /// 새로운 roic.ai 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, ROIC_BASE_URL)
    }

    /// base URL을 지정하여 생성 (테스트용).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// 기간(annual/quarterly) 하나의 비율 행을 조회합니다.
    async fn fetch_ratios(
        &self,
        ticker: &Ticker,
        kind: RatioKind,
        period: &str,
    ) -> Result<Value> {
        let url = format!(
            "{}/v2/fundamental/ratios/{}/{}",
            self.base_url,
            kind.path(),
            ticker.as_str()
        );

        let current_year = Utc::now().year();
        let start = (current_year - FISCAL_YEARS_BACK).to_string();
        let end = current_year.to_string();

        debug!(ticker = %ticker, kind = ?kind, period, "Fetching ROIC ratios");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("period", period),
                ("fiscal_year_start", start.as_str()),
                ("fiscal_year_end", end.as_str()),
                ("order", "desc"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message: format!("{} {} 비율 조회 실패", ticker, kind.path()),
            });
        }

        Ok(response.json().await?)
    }

    /// 연간 + 분기 비율 묶음을 순차로 조회합니다.
    pub async fn fetch_ratio_bundle(&self, ticker: &Ticker, kind: RatioKind) -> Result<RatioBundle> {
        let annual = self.fetch_ratios(ticker, kind, "annual").await?;
        let quarterly = self.fetch_ratios(ticker, kind, "quarterly").await?;

        Ok(RatioBundle::from_raw(annual, quarterly))
    }

    /// 실적발표 목록을 조회합니다.
    pub async fn fetch_earnings_calls(&self, ticker: &Ticker) -> Result<Vec<EarningsCall>> {
        let url = format!(
            "{}/v2/company/earnings-calls/list/{}",
            self.base_url,
            ticker.as_str()
        );

        debug!(ticker = %ticker, "Fetching earnings calls list");

        let response = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message: format!("{} 실적발표 목록 조회 실패", ticker),
            });
        }

        let raw: Value = response.json().await?;
        let calls = raw
            .as_array()
            .map(|items| items.iter().map(EarningsCall::from_roic).collect())
            .unwrap_or_default();

        Ok(calls)
    }

    /// 특정 연도/분기의 실적발표 녹취록을 조회합니다.
    ///
    /// 녹취록 스키마는 업스트림 소유이므로 JSON 그대로 반환합니다.
    pub async fn fetch_transcript(
        &self,
        ticker: &Ticker,
        year: i32,
        quarter: Quarter,
    ) -> Result<Value> {
        let url = format!(
            "{}/v2/company/earnings-calls/transcript/{}",
            self.base_url,
            ticker.as_str()
        );
        let year_str = year.to_string();
        let quarter_str = quarter.value().to_string();

        debug!(ticker = %ticker, year, quarter = quarter.value(), "Fetching transcript");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("year", year_str.as_str()),
                ("quarter", quarter_str.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message: format!("{} {}Q{} 녹취록 조회 실패", ticker, year, quarter.value()),
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_ratio_bundle_fetches_both_periods() {
        let mut server = mockito::Server::new_async().await;
        let annual = server
            .mock("GET", "/v2/fundamental/ratios/liquidity/GME")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("period".into(), "annual".into()),
                Matcher::UrlEncoded("order".into(), "desc".into()),
            ]))
            .with_status(200)
            .with_body(json!([{ "currentRatio": 1.5 }]).to_string())
            .create_async()
            .await;
        let quarterly = server
            .mock("GET", "/v2/fundamental/ratios/liquidity/GME")
            .match_query(Matcher::AllOf(vec![Matcher::UrlEncoded(
                "period".into(),
                "quarterly".into(),
            )]))
            .with_status(200)
            .with_body(json!([{ "currentRatio": 1.4 }, { "currentRatio": 1.6 }]).to_string())
            .create_async()
            .await;

        let client = RoicClient::with_base_url("test-key", server.url());
        let ticker = Ticker::parse("GME").unwrap();

        let bundle = client
            .fetch_ratio_bundle(&ticker, RatioKind::Liquidity)
            .await
            .unwrap();

        annual.assert_async().await;
        quarterly.assert_async().await;
        assert_eq!(bundle.annual.len(), 1);
        assert_eq!(bundle.quarterly.len(), 2);
    }

    #[tokio::test]
    async fn test_earnings_calls_parse() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/company/earnings-calls/list/GME")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!([
                    { "symbol": "GME", "year": 2025, "quarter": 1, "date": "2025-03-26" },
                    { "symbol": "GME", "year": 2024, "quarter": 4 }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = RoicClient::with_base_url("test-key", server.url());
        let ticker = Ticker::parse("GME").unwrap();

        let calls = client.fetch_earnings_calls(&ticker).await.unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].date, None);
    }

    #[tokio::test]
    async fn test_transcript_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/company/earnings-calls/transcript/GME")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = RoicClient::with_base_url("test-key", server.url());
        let ticker = Ticker::parse("GME").unwrap();

        let err = client
            .fetch_transcript(&ticker, 2025, Quarter::new(1).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::Upstream { status: 404, .. }));
    }
}
