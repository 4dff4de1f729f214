//! Reddit 감성 요약 에이전트.
//!
//! 집계된 게시글/댓글 텍스트를 구조화된 감성 요약으로 변환합니다.
//! 프롬프트와 출력 필드의 의미는 불투명한 계약으로 취급합니다.

use serde::{Deserialize, Serialize};
use tracing::info;

use tracker_core::domain::reddit::UnifiedSearchData;

use crate::client::ChatClient;
use crate::error::Result;

/// 에이전트 시스템 프롬프트.
const SENTIMENT_PROMPT: &str = r#"You are a financial sentiment analyst specializing in extracting actionable trading intelligence from Reddit discussions. Analyze the provided Reddit posts and comments about a stock ticker.

Respond with a single JSON object with exactly these fields:
- "sentiment": { "bullish_percent": number, "neutral_percent": number, "bearish_percent": number, "intensity_score": number (1-10), "velocity": one of "stable" | "accelerating_bullish" | "accelerating_bearish" | "flipping", "unique_users": number }
- "consensus": { "bullish_thesis": string, "bearish_thesis": string, "price_targets": string[], "timeline_expectations": string, "key_events": string[] }
- "trading_signals": { "quality_score": number (1-10), "manipulation_risk": one of "low" | "medium" | "high", "contrarian_opportunity": boolean, "conviction_follow": number (1-10), "conviction_fade": number (1-10) }
- "insights": { "key_finding": string, "predicted_outcome": string }

Ignore memes without data. Weight specific numbers, verifiable claims and recent posts more heavily. If sentiment is mixed or unclear, state that explicitly rather than forcing a conclusion."#;

/// 감성 변화 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SentimentVelocity {
    Stable,
    AcceleratingBullish,
    AcceleratingBearish,
    Flipping,
}

/// 위험도 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// 감성 지표.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct SentimentMetrics {
    pub bullish_percent: f64,
    pub neutral_percent: f64,
    pub bearish_percent: f64,
    pub intensity_score: f64,
    pub velocity: SentimentVelocity,
    pub unique_users: i64,
}

/// 커뮤니티 컨센서스.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct ConsensusView {
    pub bullish_thesis: String,
    pub bearish_thesis: String,
    pub price_targets: Vec<String>,
    pub timeline_expectations: String,
    pub key_events: Vec<String>,
}

/// 트레이딩 신호 평가.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct TradingSignals {
    pub quality_score: f64,
    pub manipulation_risk: RiskLevel,
    pub contrarian_opportunity: bool,
    pub conviction_follow: f64,
    pub conviction_fade: f64,
}

/// 핵심 인사이트.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct KeyInsights {
    pub key_finding: String,
    pub predicted_outcome: String,
}

/// 감성 요약 출력.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct SentimentSummary {
    pub sentiment: SentimentMetrics,
    pub consensus: ConsensusView,
    pub trading_signals: TradingSignals,
    pub insights: KeyInsights,
}

/// 통합 검색 데이터를 에이전트 입력 텍스트로 렌더링합니다.
///
/// 서브레딧 이름 순으로 게시글 제목/본문/댓글을 평문으로 나열합니다.
/// 순수 함수이므로 에이전트 입력을 테스트에서 재현할 수 있습니다.
pub fn render_posts(data: &UnifiedSearchData) -> String {
    let mut out = String::new();

    for (subreddit, entry) in &data.subreddits {
        if entry.posts.is_empty() {
            continue;
        }
        out.push_str(&format!("## r/{}\n", subreddit));

        for post in &entry.posts {
            out.push_str(&format!(
                "[{} points, {} comments] {}\n",
                post.score, post.num_comments, post.title
            ));
            if !post.selftext.is_empty() {
                out.push_str(&post.selftext);
                out.push('\n');
            }
            for comment in &post.comments {
                out.push_str(&format!("  > ({}) {}\n", comment.score, comment.body));
            }
            out.push('\n');
        }
    }

    out
}

/// Reddit 감성 요약 에이전트.
pub struct SentimentAgent {
    client: ChatClient,
}

impl SentimentAgent {
    /// 새로운 에이전트 생성.
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// 통합 검색 데이터를 요약합니다.
    pub async fn run(&self, data: &UnifiedSearchData) -> Result<SentimentSummary> {
        let input = format!(
            "Ticker: {}\n\n{}",
            data.metadata.ticker,
            render_posts(data)
        );

        let summary: SentimentSummary = self.client.extract(SENTIMENT_PROMPT, &input).await?;

        info!(
            ticker = %data.metadata.ticker,
            velocity = ?summary.sentiment.velocity,
            "Sentiment summary produced"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tracker_core::domain::reddit::{
        RedditComment, RedditPost, SearchMetadata, SortMethod, SubredditPosts,
    };

    fn sample_data() -> UnifiedSearchData {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let post = RedditPost {
            id: "abc".to_string(),
            title: "GME earnings play".to_string(),
            author: "dfv".to_string(),
            subreddit: "wallstreetbets".to_string(),
            score: 120,
            num_comments: 2,
            created_utc: now.timestamp(),
            selftext: "Thesis inside".to_string(),
            url: String::new(),
            permalink: String::new(),
            sort: SortMethod::Hot,
            comments: vec![RedditComment {
                id: "c1".to_string(),
                author: "bull".to_string(),
                body: "agree".to_string(),
                score: 4,
                created_utc: now.timestamp(),
                permalink: String::new(),
            }],
        };

        let mut subreddits = BTreeMap::new();
        subreddits.insert(
            "wallstreetbets".to_string(),
            SubredditPosts::from_posts(vec![post], now),
        );

        UnifiedSearchData {
            subreddits,
            metadata: SearchMetadata {
                ticker: "GME".to_string(),
                subreddits: vec!["wallstreetbets".to_string()],
                searched_at: now,
                total_posts: 1,
                total_comments: 1,
                posts_with_comments: 1,
            },
        }
    }

    #[test]
    fn test_render_posts_includes_title_body_and_comments() {
        let rendered = render_posts(&sample_data());

        assert!(rendered.contains("## r/wallstreetbets"));
        assert!(rendered.contains("[120 points, 2 comments] GME earnings play"));
        assert!(rendered.contains("Thesis inside"));
        assert!(rendered.contains("> (4) agree"));
    }

    #[test]
    fn test_render_posts_skips_empty_subreddits() {
        let mut data = sample_data();
        data.subreddits.insert(
            "empty".to_string(),
            SubredditPosts::from_posts(
                Vec::new(),
                Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            ),
        );

        let rendered = render_posts(&data);
        assert!(!rendered.contains("## r/empty"));
    }

    #[tokio::test]
    async fn test_sentiment_agent_parses_summary() {
        let mut server = mockito::Server::new_async().await;
        let payload = serde_json::json!({
            "sentiment": {
                "bullish_percent": 70.0,
                "neutral_percent": 20.0,
                "bearish_percent": 10.0,
                "intensity_score": 8.0,
                "velocity": "accelerating_bullish",
                "unique_users": 42
            },
            "consensus": {
                "bullish_thesis": "Short squeeze setup",
                "bearish_thesis": "Fundamentals weak",
                "price_targets": ["$40"],
                "timeline_expectations": "next earnings",
                "key_events": ["2025-06-10 earnings"]
            },
            "trading_signals": {
                "quality_score": 6.0,
                "manipulation_risk": "medium",
                "contrarian_opportunity": false,
                "conviction_follow": 5.0,
                "conviction_fade": 4.0
            },
            "insights": {
                "key_finding": "Unusual call volume discussion",
                "predicted_outcome": "Volatile earnings week"
            }
        });
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "choices": [{ "message": { "content": payload.to_string() } }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let agent = SentimentAgent::new(ChatClient::new("k", "m", server.url()));
        let summary = agent.run(&sample_data()).await.unwrap();

        assert_eq!(
            summary.sentiment.velocity,
            SentimentVelocity::AcceleratingBullish
        );
        assert_eq!(summary.trading_signals.manipulation_risk, RiskLevel::Medium);
    }
}
