//! 뉴스 데이터 정규화.
//!
//! EODHD 뉴스 응답을 정규화된 기사 목록으로 변환합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fundamentals::clean_decimal_value;

/// 뉴스 기사.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewsArticle {
    /// 게시 일시 (원문 형식 그대로)
    pub date: Option<String>,
    /// 제목
    pub title: Option<String>,
    /// 본문
    pub content: Option<String>,
    /// 원문 링크
    pub link: Option<String>,
    /// 관련 심볼
    pub symbols: Vec<String>,
    /// 태그
    pub tags: Vec<String>,
    /// 감성 점수
    pub sentiment: NewsSentiment,
}

/// 기사 감성 점수. 누락 시 0으로 채웁니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewsSentiment {
    /// 극성 (-1 ~ 1)
    pub polarity: Decimal,
    /// 부정 비율
    pub neg: Decimal,
    /// 중립 비율
    pub neu: Decimal,
    /// 긍정 비율
    pub pos: Decimal,
}

impl NewsArticle {
    /// EODHD 뉴스 응답의 기사 하나를 변환합니다.
    pub fn from_eodhd(raw: &Value) -> Self {
        let string_list = |v: &Value| -> Vec<String> {
            v.as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|s| s.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        let sentiment = &raw["sentiment"];

        Self {
            date: raw["date"].as_str().map(str::to_string),
            title: raw["title"].as_str().map(str::to_string),
            content: raw["content"].as_str().map(str::to_string),
            link: raw["link"].as_str().map(str::to_string),
            symbols: string_list(&raw["symbols"]),
            tags: string_list(&raw["tags"]),
            sentiment: NewsSentiment {
                polarity: clean_decimal_value(&sentiment["polarity"]).unwrap_or_default(),
                neg: clean_decimal_value(&sentiment["neg"]).unwrap_or_default(),
                neu: clean_decimal_value(&sentiment["neu"]).unwrap_or_default(),
                pos: clean_decimal_value(&sentiment["pos"]).unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_from_eodhd() {
        let raw = json!({
            "date": "2025-05-01T12:00:00+00:00",
            "title": "GameStop announces results",
            "content": "...",
            "link": "https://example.com/article",
            "symbols": ["GME.US"],
            "tags": ["earnings"],
            "sentiment": { "polarity": 0.4, "neg": 0.1, "neu": 0.5, "pos": 0.4 }
        });

        let article = NewsArticle::from_eodhd(&raw);

        assert_eq!(article.symbols, vec!["GME.US".to_string()]);
        assert_eq!(article.sentiment.polarity.to_string(), "0.4");
    }

    #[test]
    fn test_article_missing_sentiment_defaults_to_zero() {
        let raw = json!({ "title": "no sentiment" });

        let article = NewsArticle::from_eodhd(&raw);

        assert!(article.date.is_none());
        assert_eq!(article.sentiment.polarity, Decimal::ZERO);
        assert!(article.symbols.is_empty());
    }
}
