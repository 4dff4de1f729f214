//! Reddit 게시글/댓글 도메인 타입과 집계 순수 함수.
//!
//! 수집 루틴의 핵심 규칙이 이 모듈에 모여 있습니다:
//! - 정렬 방식별 수집 (hot: 최근 1주, new: 최근 1일)
//! - id 기준 병합 (중복 시 높은 score 유지)
//! - 참여도 가중 최신성 점수로 랭킹
//!
//! 네트워크 호출은 포함하지 않으며, 모든 함수는 순수 함수입니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 게시글이 발견된 정렬 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SortMethod {
    /// 인기 게시글 (최근 1주 검색 창)
    Hot,
    /// 신규 게시글 (최근 1일 검색 창)
    New,
}

impl SortMethod {
    /// Reddit 검색 API의 sort 파라미터 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMethod::Hot => "hot",
            SortMethod::New => "new",
        }
    }

    /// 정렬 방식에 대응하는 시간 창 (t 파라미터).
    pub fn time_window(&self) -> &'static str {
        match self {
            SortMethod::Hot => "week",
            SortMethod::New => "day",
        }
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reddit 게시글.
///
/// 식별 키는 `id`이며, 수집 이후에는 `comments` 첨부 외에 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct RedditPost {
    /// 서브레딧 내에서 고유한 게시글 id
    pub id: String,
    /// 제목
    pub title: String,
    /// 작성자
    pub author: String,
    /// 서브레딧 이름
    pub subreddit: String,
    /// 점수 (업보트 합산)
    pub score: i64,
    /// 댓글 수
    pub num_comments: i64,
    /// 작성 시각 (epoch 초)
    pub created_utc: i64,
    /// 본문 텍스트
    pub selftext: String,
    /// 게시글이 가리키는 URL
    pub url: String,
    /// 정규화된 permalink
    pub permalink: String,
    /// 발견된 정렬 방식
    pub sort: SortMethod,
    /// 선택된 게시글에만 첨부되는 댓글 목록
    #[serde(default)]
    pub comments: Vec<RedditComment>,
}

/// Reddit 댓글. 정확히 하나의 게시글에 속합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct RedditComment {
    /// 댓글 id
    pub id: String,
    /// 작성자
    pub author: String,
    /// 본문
    pub body: String,
    /// 점수
    pub score: i64,
    /// 작성 시각 (epoch 초)
    pub created_utc: i64,
    /// permalink
    pub permalink: String,
}

/// 참여도 가중 최신성 점수.
///
/// `(score + num_comments * 2) / (age_hours + 2)`
///
/// 댓글 수를 score의 2배로 가중하고, 분모의 `+2`는 갓 올라온
/// 게시글의 나이 0 근처에서 점수가 발산하는 것을 막습니다.
pub fn relevance_score(post: &RedditPost, now: DateTime<Utc>) -> f64 {
    let age_secs = (now.timestamp() - post.created_utc).max(0);
    let age_hours = age_secs as f64 / 3600.0;
    let engagement = (post.score + post.num_comments * 2) as f64;

    engagement / (age_hours + 2.0)
}

/// 두 정렬 패스의 결과를 id 기준으로 병합합니다.
///
/// 같은 id가 양쪽에 모두 있으면 score가 높은 쪽을 유지합니다.
/// 두 패스 사이에 참여도가 변할 수 있으므로 높은 score를
/// 더 최신 상태로 간주합니다.
pub fn merge_by_id(hot: Vec<RedditPost>, new: Vec<RedditPost>) -> Vec<RedditPost> {
    let mut merged: HashMap<String, RedditPost> = HashMap::with_capacity(hot.len() + new.len());

    for post in hot.into_iter().chain(new.into_iter()) {
        let keep_existing = merged
            .get(&post.id)
            .is_some_and(|existing| existing.score >= post.score);

        if !keep_existing {
            merged.insert(post.id.clone(), post);
        }
    }

    merged.into_values().collect()
}

/// 게시글을 relevance 점수 내림차순으로 정렬합니다.
///
/// 점수가 같으면 더 최신 게시글이 앞에 옵니다.
pub fn rank_posts(mut posts: Vec<RedditPost>, now: DateTime<Utc>) -> Vec<RedditPost> {
    posts.sort_by(|a, b| {
        let ra = relevance_score(a, now);
        let rb = relevance_score(b, now);
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_utc.cmp(&a.created_utc))
    });
    posts
}

/// 서브레딧 하나에 대한 수집 결과.
///
/// 수집 실패 시 `posts`는 비어 있고 `error`에 사유가 담깁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct SubredditPosts {
    /// 랭킹 순으로 정렬된 게시글 (상한 있음)
    pub posts: Vec<RedditPost>,
    /// 게시글 수
    pub count: usize,
    /// 수집 시각
    pub fetched_at: DateTime<Utc>,
    /// 수집 실패 사유 (성공 시 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubredditPosts {
    /// 성공 결과 생성.
    pub fn from_posts(posts: Vec<RedditPost>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            count: posts.len(),
            posts,
            fetched_at,
            error: None,
        }
    }

    /// 실패 결과 생성. 게시글은 비우고 사유만 남깁니다.
    pub fn from_error(reason: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            posts: Vec::new(),
            count: 0,
            fetched_at,
            error: Some(reason.into()),
        }
    }
}

/// 검색 1회에 대한 메타데이터. 반환 후 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct SearchMetadata {
    /// 검색한 티커
    pub ticker: String,
    /// 검색한 서브레딧 목록 (입력 순서)
    pub subreddits: Vec<String>,
    /// 검색 시각
    pub searched_at: DateTime<Utc>,
    /// 전체 게시글 수
    pub total_posts: usize,
    /// 전체 댓글 수
    pub total_comments: usize,
    /// 댓글이 1개 이상 첨부된 게시글 수
    pub posts_with_comments: usize,
}

/// 서브레딧별 결과와 메타데이터를 묶은 통합 검색 데이터.
///
/// 저장 레코드(`data_version = 2`)의 본문 형식입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct UnifiedSearchData {
    /// 서브레딧 이름 → 수집 결과
    pub subreddits: BTreeMap<String, SubredditPosts>,
    /// 검색 메타데이터
    pub metadata: SearchMetadata,
}

impl UnifiedSearchData {
    /// 이전 통합 데이터 위에 이 데이터를 얕게 병합합니다.
    ///
    /// 서브레딧 키 단위 last-write-wins: 겹치는 키는 이번 결과로
    /// 통째로 교체되고, 이전에만 있던 키는 유지됩니다.
    /// 메타데이터는 이번 검색 것을 사용합니다.
    pub fn merged_over(self, previous: UnifiedSearchData) -> UnifiedSearchData {
        let mut subreddits = previous.subreddits;
        subreddits.extend(self.subreddits);

        UnifiedSearchData {
            subreddits,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(id: &str, score: i64, num_comments: i64, created_utc: i64) -> RedditPost {
        RedditPost {
            id: id.to_string(),
            title: format!("post {}", id),
            author: "tester".to_string(),
            subreddit: "wallstreetbets".to_string(),
            score,
            num_comments,
            created_utc,
            selftext: String::new(),
            url: format!("https://reddit.com/{}", id),
            permalink: format!("https://reddit.com/r/wallstreetbets/comments/{}", id),
            sort: SortMethod::Hot,
            comments: Vec::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_merge_keeps_higher_score() {
        let hot = vec![post("a", 10, 0, 0), post("b", 5, 0, 0)];
        let new = vec![post("a", 25, 0, 0)];

        let merged = merge_by_id(hot, new);
        assert_eq!(merged.len(), 2);

        let a = merged.iter().find(|p| p.id == "a").unwrap();
        assert_eq!(a.score, 25);
    }

    #[test]
    fn test_merge_keeps_first_when_scores_equal() {
        let hot = vec![post("a", 10, 3, 0)];
        let mut dup = post("a", 10, 0, 0);
        dup.sort = SortMethod::New;

        let merged = merge_by_id(hot, vec![dup]);
        assert_eq!(merged.len(), 1);
        // 동점이면 먼저 본 hot 패스의 복사본 유지
        assert_eq!(merged[0].num_comments, 3);
    }

    #[test]
    fn test_relevance_weights_comments_double() {
        let now = now();
        let created = now.timestamp() - 3600; // 1시간 전

        let upvoted = post("a", 10, 0, created);
        let discussed = post("b", 0, 6, created);

        // 댓글 6개(=12점)가 score 10보다 높게 평가됨
        assert!(relevance_score(&discussed, now) > relevance_score(&upvoted, now));
    }

    #[test]
    fn test_rank_same_age_higher_engagement_first() {
        let now = now();
        let created = now.timestamp() - 7200;

        let low = post("low", 5, 1, created);
        let high = post("high", 5, 10, created);

        let ranked = rank_posts(vec![low, high], now);
        assert_eq!(ranked[0].id, "high");
    }

    #[test]
    fn test_rank_same_engagement_newer_first() {
        let now = now();

        let older = post("older", 10, 2, now.timestamp() - 86_400);
        let newer = post("newer", 10, 2, now.timestamp() - 3600);

        let ranked = rank_posts(vec![older, newer], now);
        assert_eq!(ranked[0].id, "newer");
    }

    #[test]
    fn test_relevance_no_blowup_for_fresh_posts() {
        let now = now();
        let fresh = post("fresh", 2, 0, now.timestamp());

        // 분모 하한 +2 덕분에 유한한 값
        assert!(relevance_score(&fresh, now) <= 1.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// 랭킹 결과는 relevance 비증가 순서를 유지한다.
            #[test]
            fn ranked_posts_are_sorted_by_relevance(
                entries in proptest::collection::vec((0i64..10_000, 0i64..1_000, 0i64..604_800), 0..40)
            ) {
                let now = now();
                let posts: Vec<RedditPost> = entries
                    .iter()
                    .enumerate()
                    .map(|(i, (score, comments, age_secs))| {
                        post(&format!("p{}", i), *score, *comments, now.timestamp() - age_secs)
                    })
                    .collect();

                let ranked = rank_posts(posts, now);

                for pair in ranked.windows(2) {
                    prop_assert!(
                        relevance_score(&pair[0], now) >= relevance_score(&pair[1], now)
                    );
                }
            }

            /// 병합 결과의 게시글 수는 고유 id 수와 같다.
            #[test]
            fn merge_keeps_exactly_unique_ids(
                hot_ids in proptest::collection::vec(0u8..20, 0..20),
                new_ids in proptest::collection::vec(0u8..20, 0..20)
            ) {
                let hot: Vec<RedditPost> =
                    hot_ids.iter().map(|id| post(&format!("p{}", id), 1, 0, 0)).collect();
                let new: Vec<RedditPost> =
                    new_ids.iter().map(|id| post(&format!("p{}", id), 2, 0, 0)).collect();

                let mut unique: Vec<u8> = hot_ids.iter().chain(new_ids.iter()).copied().collect();
                unique.sort_unstable();
                unique.dedup();

                prop_assert_eq!(merge_by_id(hot, new).len(), unique.len());
            }
        }
    }

    #[test]
    fn test_unified_merge_is_last_write_wins_per_subreddit() {
        let now = now();
        let meta = |subs: Vec<&str>| SearchMetadata {
            ticker: "GME".to_string(),
            subreddits: subs.iter().map(|s| s.to_string()).collect(),
            searched_at: now,
            total_posts: 0,
            total_comments: 0,
            posts_with_comments: 0,
        };

        let mut old_map = BTreeMap::new();
        old_map.insert(
            "stocks".to_string(),
            SubredditPosts::from_posts(vec![post("s1", 1, 0, 0)], now),
        );
        old_map.insert(
            "options".to_string(),
            SubredditPosts::from_posts(vec![post("o1", 1, 0, 0)], now),
        );
        let previous = UnifiedSearchData {
            subreddits: old_map,
            metadata: meta(vec!["stocks", "options"]),
        };

        let mut new_map = BTreeMap::new();
        new_map.insert(
            "stocks".to_string(),
            SubredditPosts::from_posts(vec![post("s2", 9, 0, 0), post("s3", 7, 0, 0)], now),
        );
        let fresh = UnifiedSearchData {
            subreddits: new_map,
            metadata: meta(vec!["stocks"]),
        };

        let merged = fresh.merged_over(previous);

        // 겹치는 키는 통째로 교체, 이전 키는 유지
        assert_eq!(merged.subreddits["stocks"].count, 2);
        assert_eq!(merged.subreddits["options"].count, 1);
        assert_eq!(merged.metadata.subreddits, vec!["stocks".to_string()]);
    }
}
