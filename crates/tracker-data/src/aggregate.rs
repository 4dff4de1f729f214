//! 서브레딧 검색 집계 루틴.
//!
//! 티커와 서브레딧 집합을 받아 서브레딧별로:
//! 1. hot(최근 1주)/new(최근 1일) 두 정렬 패스를 동시에 조회
//! 2. id 기준 병합 (중복 시 높은 score 유지)
//! 3. relevance 점수 내림차순 랭킹 후 상위 20개로 절단
//! 4. 댓글이 있는 상위 5개 게시글에 한해, 요청 간 최소 간격을
//!    지키며 순차적으로 댓글(best, 최대 10개)을 첨부
//!
//! 서브레딧은 입력 순서대로 한 번에 하나씩 처리하며, 한 서브레딧의
//! 실패(게시글/댓글 조회 모두)는 해당 서브레딧의 error 항목으로
//! 격리되고 다음 서브레딧 처리는 계속됩니다.

use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

use tracker_core::domain::reddit::{
    merge_by_id, rank_posts, RedditPost, SearchMetadata, SortMethod, SubredditPosts,
    UnifiedSearchData,
};
use tracker_core::types::Ticker;

use crate::error::{DataError, Result};
use crate::pacing::MinIntervalGate;
use crate::provider::RedditClient;

/// hot 패스 조회 상한.
pub const HOT_LIMIT: u32 = 25;

/// new 패스 조회 상한.
pub const NEW_LIMIT: u32 = 25;

/// 랭킹 후 서브레딧당 유지하는 게시글 수.
pub const MAX_POSTS_PER_SUBREDDIT: usize = 20;

/// 서브레딧당 댓글을 확장하는 게시글 수.
pub const MAX_POSTS_WITH_COMMENTS: usize = 5;

/// 게시글당 조회하는 댓글 수.
pub const COMMENT_LIMIT: u32 = 10;

/// 집계 한도 설정.
#[derive(Debug, Clone)]
pub struct AggregationLimits {
    /// hot 패스 조회 상한
    pub hot_limit: u32,
    /// new 패스 조회 상한
    pub new_limit: u32,
    /// 랭킹 후 유지하는 게시글 수
    pub max_posts: usize,
    /// 댓글을 확장하는 게시글 수
    pub max_posts_with_comments: usize,
    /// 게시글당 댓글 수
    pub comment_limit: u32,
}

impl Default for AggregationLimits {
    fn default() -> Self {
        Self {
            hot_limit: HOT_LIMIT,
            new_limit: NEW_LIMIT,
            max_posts: MAX_POSTS_PER_SUBREDDIT,
            max_posts_with_comments: MAX_POSTS_WITH_COMMENTS,
            comment_limit: COMMENT_LIMIT,
        }
    }
}

/// 집계 결과.
///
/// `results`는 입력 서브레딧 순서를 보존하고, `unified`는 같은
/// 내용을 저장 형식(서브레딧 맵 + 메타데이터)으로 담습니다.
#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    /// 입력 순서의 (서브레딧, 결과) 목록
    pub results: Vec<(String, SubredditPosts)>,
    /// 저장용 통합 데이터
    pub unified: UnifiedSearchData,
}

/// Reddit 검색 집계기.
///
/// 요청마다 새로 생성되는 일회성 상태이며, 호출 간 공유 자원은
/// 없습니다.
pub struct RedditAggregator {
    reddit: RedditClient,
    gate: MinIntervalGate,
    limits: AggregationLimits,
}

impl RedditAggregator {
    /// 새로운 집계기 생성.
    ///
    /// # Arguments
    /// * `reddit` - Reddit 클라이언트
    /// * `comment_fetch_delay` - 댓글 요청 간 최소 간격
    pub fn new(reddit: RedditClient, comment_fetch_delay: Duration) -> Self {
        Self {
            reddit,
            gate: MinIntervalGate::new(comment_fetch_delay),
            limits: AggregationLimits::default(),
        }
    }

    /// 한도 설정을 교체합니다 (테스트용).
    pub fn with_limits(mut self, limits: AggregationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 서브레딧 집합에서 티커를 검색하고 결과를 집계합니다.
    ///
    /// # Errors
    /// 서브레딧 목록이 비어 있으면 `DataError::InvalidData`를
    /// 반환합니다. 개별 서브레딧의 수집 실패는 에러가 아니라 해당
    /// 서브레딧의 `error` 항목이 됩니다.
    pub async fn search(
        &self,
        ticker: &Ticker,
        subreddits: &[String],
    ) -> Result<AggregationOutcome> {
        if subreddits.is_empty() {
            return Err(DataError::InvalidData(
                "서브레딧 목록이 비어 있습니다".to_string(),
            ));
        }

        let searched_at = Utc::now();
        let mut results: Vec<(String, SubredditPosts)> = Vec::with_capacity(subreddits.len());

        for subreddit in subreddits {
            let entry = match self.search_subreddit(ticker, subreddit).await {
                Ok(posts) => {
                    info!(
                        ticker = %ticker,
                        subreddit = %subreddit,
                        count = posts.len(),
                        "Subreddit search complete"
                    );
                    SubredditPosts::from_posts(posts, Utc::now())
                }
                Err(e) => {
                    warn!(
                        ticker = %ticker,
                        subreddit = %subreddit,
                        error = %e,
                        "Subreddit search failed"
                    );
                    SubredditPosts::from_error(
                        format!("r/{} 검색 실패: {}", subreddit, e),
                        Utc::now(),
                    )
                }
            };
            results.push((subreddit.clone(), entry));
        }

        let total_posts: usize = results.iter().map(|(_, r)| r.count).sum();
        let total_comments: usize = results
            .iter()
            .flat_map(|(_, r)| r.posts.iter())
            .map(|p| p.comments.len())
            .sum();
        let posts_with_comments = results
            .iter()
            .flat_map(|(_, r)| r.posts.iter())
            .filter(|p| !p.comments.is_empty())
            .count();

        let metadata = SearchMetadata {
            ticker: ticker.to_string(),
            subreddits: subreddits.to_vec(),
            searched_at,
            total_posts,
            total_comments,
            posts_with_comments,
        };

        let subreddit_map: BTreeMap<String, SubredditPosts> = results
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();

        Ok(AggregationOutcome {
            results,
            unified: UnifiedSearchData {
                subreddits: subreddit_map,
                metadata,
            },
        })
    }

    /// 서브레딧 하나를 수집합니다: 두 패스 조회 → 병합 → 랭킹 →
    /// 절단 → 댓글 확장.
    async fn search_subreddit(&self, ticker: &Ticker, subreddit: &str) -> Result<Vec<RedditPost>> {
        // 두 정렬 패스는 동시에 발행하고 함께 대기
        let (hot, new) = tokio::join!(
            self.reddit
                .search_posts(subreddit, ticker.as_str(), SortMethod::Hot, self.limits.hot_limit),
            self.reddit
                .search_posts(subreddit, ticker.as_str(), SortMethod::New, self.limits.new_limit),
        );

        let merged = merge_by_id(hot?, new?);
        let mut ranked = rank_posts(merged, Utc::now());
        ranked.truncate(self.limits.max_posts);

        // 랭킹 순으로 댓글이 있는 게시글만 확장, 요청은 순차 + 간격 준수
        let mut expanded = 0;
        for post in ranked.iter_mut() {
            if expanded >= self.limits.max_posts_with_comments {
                break;
            }
            if post.num_comments <= 0 {
                continue;
            }

            self.gate.wait().await;
            post.comments = self
                .reddit
                .fetch_comments(subreddit, &post.id, self.limits.comment_limit)
                .await?;
            expanded += 1;
        }

        Ok(ranked)
    }
}
