//! Reddit 공개 JSON API 클라이언트.
//!
//! 인증 없이 동작하며 커스텀 User-Agent 헤더만 요구합니다.
//!
//! # 지원 요청
//!
//! - 서브레딧 내 티커 검색 (`/r/{subreddit}/search.json`)
//!   - sort=hot은 최근 1주, sort=new는 최근 1일 창을 사용
//! - 게시글 댓글 조회 (`/r/{subreddit}/comments/{id}.json`, sort=best)
//!
//! # 사용 예시
//! ```rust,ignore
//! let client = RedditClient::new("TickerTracker/0.1");
//! let posts = client
//!     .search_posts("wallstreetbets", "GME", SortMethod::Hot, 25)
//!     .await?;
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use tracker_core::domain::reddit::{RedditComment, RedditPost, SortMethod};

use crate::error::{DataError, Result};

const REDDIT_BASE_URL: &str = "https://www.reddit.com";

/// Reddit 공개 API 클라이언트.
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
}

// ==================== 응답 envelope ====================

/// Reddit listing envelope.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    #[serde(default)]
    kind: String,
    data: Value,
}

/// 검색 결과의 게시글 payload.
#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    permalink: String,
}

/// 댓글 listing의 payload (kind == "t1"만 해당).
#[derive(Debug, Deserialize)]
struct CommentData {
    id: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    permalink: String,
}

impl RedditClient {
    /// 새로운 Reddit 클라이언트 생성.
    ///
    /// # Arguments
    /// * `user_agent` - 요청에 사용할 User-Agent 헤더
    pub fn new(user_agent: &str) -> Self {
        Self::with_base_url(user_agent, REDDIT_BASE_URL)
    }

    /// base URL을 지정하여 생성 (테스트용).
    pub fn with_base_url(user_agent: &str, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: base_url.into(),
        }
    }

    /// 서브레딧에서 티커를 검색합니다.
    ///
    /// sort 방식에 대응하는 시간 창(hot: week, new: day)이 함께
    /// 적용되며, 결과는 발견된 정렬 방식이 기록된 게시글 목록입니다.
    pub async fn search_posts(
        &self,
        subreddit: &str,
        ticker: &str,
        sort: SortMethod,
        limit: u32,
    ) -> Result<Vec<RedditPost>> {
        let url = format!("{}/r/{}/search.json", self.base_url, subreddit);
        let limit_str = limit.to_string();

        debug!(subreddit, ticker, sort = %sort, "Searching subreddit");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", ticker),
                ("restrict_sr", "true"),
                ("sort", sort.as_str()),
                ("t", sort.time_window()),
                ("limit", limit_str.as_str()),
                ("raw_json", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message: format!("r/{} 검색 실패", subreddit),
            });
        }

        let listing: Listing = response.json().await?;

        let posts = listing
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t3")
            .filter_map(|child| serde_json::from_value::<PostData>(child.data).ok())
            .map(|data| RedditPost {
                id: data.id,
                title: data.title,
                author: data.author,
                subreddit: data.subreddit,
                score: data.score,
                num_comments: data.num_comments,
                created_utc: data.created_utc as i64,
                selftext: data.selftext,
                url: data.url,
                permalink: format!("https://reddit.com{}", data.permalink),
                sort,
                comments: Vec::new(),
            })
            .collect();

        Ok(posts)
    }

    /// 게시글의 상위 댓글을 조회합니다 (sort=best).
    ///
    /// 응답 배열의 두 번째 listing이 댓글 트리이며, 최상위 항목 중
    /// `kind == "t1"`인 것만 취합니다 ("more" placeholder는 제외).
    pub async fn fetch_comments(
        &self,
        subreddit: &str,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<RedditComment>> {
        let url = format!("{}/r/{}/comments/{}.json", self.base_url, subreddit, post_id);
        let limit_str = limit.to_string();

        debug!(subreddit, post_id, "Fetching comments");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("sort", "best"),
                ("limit", limit_str.as_str()),
                ("raw_json", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Upstream {
                status: status.as_u16(),
                message: format!("게시글 {} 댓글 조회 실패", post_id),
            });
        }

        let listings: Vec<Listing> = response.json().await?;

        // [0] = 게시글 자신, [1] = 댓글 트리
        let Some(comment_listing) = listings.into_iter().nth(1) else {
            return Ok(Vec::new());
        };

        let comments = comment_listing
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t1")
            .filter_map(|child| serde_json::from_value::<CommentData>(child.data).ok())
            .take(limit as usize)
            .map(|data| RedditComment {
                id: data.id,
                author: data.author,
                body: data.body,
                score: data.score,
                created_utc: data.created_utc as i64,
                permalink: format!("https://reddit.com{}", data.permalink),
            })
            .collect();

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn post_child(id: &str, score: i64) -> Value {
        json!({
            "kind": "t3",
            "data": {
                "id": id,
                "title": format!("title {}", id),
                "author": "dfv",
                "subreddit": "wallstreetbets",
                "score": score,
                "num_comments": 3,
                "created_utc": 1_717_200_000.0,
                "selftext": "to the moon",
                "url": "https://example.com",
                "permalink": format!("/r/wallstreetbets/comments/{}/", id)
            }
        })
    }

    #[tokio::test]
    async fn test_search_posts_parses_listing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/r/wallstreetbets/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "GME".into()),
                Matcher::UrlEncoded("restrict_sr".into(), "true".into()),
                Matcher::UrlEncoded("sort".into(), "hot".into()),
                Matcher::UrlEncoded("t".into(), "week".into()),
                Matcher::UrlEncoded("limit".into(), "25".into()),
                Matcher::UrlEncoded("raw_json".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "kind": "Listing",
                    "data": { "children": [post_child("abc", 42)] }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = RedditClient::with_base_url("TickerTracker/0.1", server.url());
        let posts = client
            .search_posts("wallstreetbets", "GME", SortMethod::Hot, 25)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "abc");
        assert_eq!(posts[0].score, 42);
        assert_eq!(posts[0].sort, SortMethod::Hot);
        assert!(posts[0].permalink.starts_with("https://reddit.com/r/"));
    }

    #[tokio::test]
    async fn test_search_posts_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/r/stocks/search.json")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = RedditClient::with_base_url("TickerTracker/0.1", server.url());
        let err = client
            .search_posts("stocks", "GME", SortMethod::New, 25)
            .await
            .unwrap_err();

        assert!(matches!(err, DataError::Upstream { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_comments_skips_more_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/r/wallstreetbets/comments/abc.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!([
                    { "kind": "Listing", "data": { "children": [post_child("abc", 42)] } },
                    { "kind": "Listing", "data": { "children": [
                        {
                            "kind": "t1",
                            "data": {
                                "id": "c1",
                                "author": "bull",
                                "body": "diamond hands",
                                "score": 12,
                                "created_utc": 1_717_210_000.0,
                                "permalink": "/r/wallstreetbets/comments/abc/c1/"
                            }
                        },
                        { "kind": "more", "data": { "count": 57, "children": ["x", "y"] } }
                    ] } }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = RedditClient::with_base_url("TickerTracker/0.1", server.url());
        let comments = client
            .fetch_comments("wallstreetbets", "abc", 10)
            .await
            .unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "c1");
        assert_eq!(comments[0].body, "diamond hands");
    }
}
