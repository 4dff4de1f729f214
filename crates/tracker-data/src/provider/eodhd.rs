//! EODHD 클라이언트.
//!
//! 미국 주식의 펀더멘털 데이터와 뉴스를 EODHD API에서 수집합니다.
//! 티커는 거래소 코드가 붙은 형식(`AAPL.US`)으로 조회합니다.
//!
//! ## 데이터 소스
//! - `/api/fundamentals/{symbol}`: General, Highlights, 재무제표
//! - `/api/news?s={symbol}`: 감성 점수가 포함된 최근 뉴스

use chrono::{Datelike, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use tracker_core::domain::fundamentals::FundamentalSnapshot;
use tracker_core::domain::news::NewsArticle;
use tracker_core::types::Ticker;

use crate::error::{DataError, Result};

const EODHD_BASE_URL: &str = "https://eodhd.com";

/// 한 번에 조회하는 뉴스 기사 수.
const NEWS_LIMIT: u32 = 10;

/// EODHD API 클라이언트.
#[derive(Debug, Clone)]
pub struct EodhdClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl EodhdClient {
    /// 새로운 EODHD 클라이언트 생성.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, EODHD_BASE_URL)
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

    /// 펀더멘털 데이터를 조회하고 정규화된 스냅샷으로 변환합니다.
    pub async fn fetch_fundamentals(&self, ticker: &Ticker) -> Result<FundamentalSnapshot> {
        let url = format!(
            "{}/api/fundamentals/{}",
            self.base_url,
            ticker.with_us_exchange()
        );

        debug!(ticker = %ticker, "Fetching EODHD fundamentals");

        let response = self
            .client
            .get(&url)
            .query(&[("api_token", self.api_key.as_str()), ("fmt", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message: format!("{} 펀더멘털 조회 실패", ticker),
            });
        }

        let raw: Value = response.json().await?;
        Ok(FundamentalSnapshot::from_eodhd(&raw, Utc::now().year()))
    }

    /// 최근 뉴스 기사를 조회합니다.
    pub async fn fetch_news(&self, ticker: &Ticker) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/api/news", self.base_url);
        let symbol = ticker.with_us_exchange();
        let limit = NEWS_LIMIT.to_string();

        debug!(ticker = %ticker, "Fetching EODHD news");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("s", symbol.as_str()),
                ("offset", "0"),
                ("limit", limit.as_str()),
                ("api_token", self.api_key.as_str()),
                ("fmt", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message: format!("{} 뉴스 조회 실패", ticker),
            });
        }

        let raw: Value = response.json().await?;
        let articles = raw
            .as_array()
            .map(|items| items.iter().map(NewsArticle::from_eodhd).collect())
            .unwrap_or_default();

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_fundamentals_reshapes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/fundamentals/GME.US")
            .match_query(Matcher::UrlEncoded("api_token".into(), "test-key".into()))
            .with_status(200)
            .with_body(
                json!({
                    "General": { "Name": "GameStop Corp", "Code": "GME" },
                    "Highlights": { "MarketCapitalization": "NA", "PERatio": "12.5" },
                    "Financials": {}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = EodhdClient::with_base_url("test-key", server.url());
        let ticker = Ticker::parse("GME").unwrap();

        let snapshot = client.fetch_fundamentals(&ticker).await.unwrap();

        assert_eq!(snapshot.name.as_deref(), Some("GameStop Corp"));
        assert!(snapshot.highlights.market_cap.is_none());
        assert_eq!(snapshot.highlights.pe_ratio.unwrap().to_string(), "12.5");
    }

    #[tokio::test]
    async fn test_fetch_news_non_array_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/news")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "message": "no data" }).to_string())
            .create_async()
            .await;

        let client = EodhdClient::with_base_url("test-key", server.url());
        let ticker = Ticker::parse("GME").unwrap();

        let articles = client.fetch_news(&ticker).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_status_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/fundamentals/GME.US")
            .match_query(Matcher::Any)
            .with_status(402)
            .create_async()
            .await;

        let client = EodhdClient::with_base_url("test-key", server.url());
        let ticker = Ticker::parse("GME").unwrap();

        let err = client.fetch_fundamentals(&ticker).await.unwrap_err();
        assert!(matches!(err, DataError::Upstream { status: 402, .. }));
    }
}
