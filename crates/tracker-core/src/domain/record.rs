//! 저장 레코드 본문 형식.
//!
//! `ticker_searches` 행은 두 세대의 형식이 공존합니다:
//! - `data_version = 1`: 서브레딧당 1행, `search_data`에 게시글 배열
//! - `data_version = 2`: 티커당 병합되는 통합 행, `unified_search_data`
//!
//! 읽기 경로에서 형식을 즉석 판별하는 대신, 버전 판별자를 키로
//! 명시적 태그 유니언으로 모델링하고 순수 변환 함수를 제공합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::reddit::{RedditPost, SearchMetadata, SubredditPosts, UnifiedSearchData};

/// 통합 형식의 버전 판별자 값.
pub const UNIFIED_DATA_VERSION: i32 = 2;

/// 구 형식의 버전 판별자 값.
pub const LEGACY_DATA_VERSION: i32 = 1;

/// 저장 레코드 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "data_version")]
pub enum SearchRecordData {
    /// 구 형식: 서브레딧 하나의 게시글 배열.
    #[serde(rename = "1")]
    Legacy {
        /// 이 행이 담당하는 서브레딧
        subreddit: String,
        /// 당시 저장된 게시글 목록
        posts: Vec<RedditPost>,
    },
    /// 통합 형식: 서브레딧 맵 + 메타데이터.
    #[serde(rename = "2")]
    Unified(UnifiedSearchData),
}

impl SearchRecordData {
    /// 버전 판별자 반환.
    pub fn data_version(&self) -> i32 {
        match self {
            SearchRecordData::Legacy { .. } => LEGACY_DATA_VERSION,
            SearchRecordData::Unified(_) => UNIFIED_DATA_VERSION,
        }
    }

    /// 구 형식을 통합 형식으로 변환합니다.
    ///
    /// 구 행은 서브레딧 하나짜리 통합 맵으로 감싸집니다.
    /// 구 형식에는 댓글 집계가 없었으므로 댓글 관련 합계는 0입니다.
    pub fn into_unified(self, ticker: &str, recorded_at: DateTime<Utc>) -> UnifiedSearchData {
        match self {
            SearchRecordData::Unified(unified) => unified,
            SearchRecordData::Legacy { subreddit, posts } => {
                let total_posts = posts.len();

                let mut subreddits = BTreeMap::new();
                subreddits.insert(
                    subreddit.clone(),
                    SubredditPosts::from_posts(posts, recorded_at),
                );

                UnifiedSearchData {
                    subreddits,
                    metadata: SearchMetadata {
                        ticker: ticker.to_string(),
                        subreddits: vec![subreddit],
                        searched_at: recorded_at,
                        total_posts,
                        total_comments: 0,
                        posts_with_comments: 0,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reddit::SortMethod;
    use chrono::TimeZone;

    fn post(id: &str) -> RedditPost {
        RedditPost {
            id: id.to_string(),
            title: "t".to_string(),
            author: "a".to_string(),
            subreddit: "stocks".to_string(),
            score: 1,
            num_comments: 0,
            created_utc: 0,
            selftext: String::new(),
            url: String::new(),
            permalink: String::new(),
            sort: SortMethod::Hot,
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_legacy_into_unified() {
        let recorded_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let legacy = SearchRecordData::Legacy {
            subreddit: "stocks".to_string(),
            posts: vec![post("a"), post("b")],
        };
        assert_eq!(legacy.data_version(), LEGACY_DATA_VERSION);

        let unified = legacy.into_unified("GME", recorded_at);

        assert_eq!(unified.metadata.ticker, "GME");
        assert_eq!(unified.metadata.total_posts, 2);
        assert_eq!(unified.metadata.total_comments, 0);
        assert_eq!(unified.subreddits.len(), 1);
        assert_eq!(unified.subreddits["stocks"].count, 2);
        assert_eq!(unified.subreddits["stocks"].fetched_at, recorded_at);
    }

    #[test]
    fn test_unified_passthrough() {
        let recorded_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let unified = UnifiedSearchData {
            subreddits: BTreeMap::new(),
            metadata: SearchMetadata {
                ticker: "GME".to_string(),
                subreddits: vec![],
                searched_at: recorded_at,
                total_posts: 0,
                total_comments: 0,
                posts_with_comments: 0,
            },
        };

        let data = SearchRecordData::Unified(unified.clone());
        assert_eq!(data.data_version(), UNIFIED_DATA_VERSION);

        let converted = data.into_unified("GME", recorded_at);
        assert_eq!(converted.metadata.searched_at, unified.metadata.searched_at);
    }
}
