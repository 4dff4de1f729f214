//! 데이터베이스 저장소.
//!
//! 모든 저장소는 `&PgPool`을 받는 stateless 연관 함수로 구성됩니다.
//! 스키마는 외부에서 관리되며, 기대하는 DDL은 다음과 같습니다:
//!
//! ```sql
//! CREATE TABLE ticker_searches (
//!     id                          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     ticker                      TEXT NOT NULL,
//!     subreddit                   TEXT,            -- legacy (data_version = 1)
//!     search_query                TEXT,
//!     search_data                 JSONB,           -- legacy 게시글 배열
//!     unified_search_data         JSONB,           -- data_version = 2
//!     data_version                INT NOT NULL DEFAULT 1,
//!     fundamental_data            JSONB,
//!     fundamental_data_updated_at TIMESTAMPTZ,
//!     news_data                   JSONB,
//!     news_data_updated_at        TIMESTAMPTZ,
//!     liquidity_ratios_data       JSONB,
//!     liquidity_ratios_updated_at TIMESTAMPTZ,
//!     credit_ratios_data          JSONB,
//!     credit_ratios_updated_at    TIMESTAMPTZ,
//!     earnings_calls_data         JSONB,
//!     earnings_calls_updated_at   TIMESTAMPTZ,
//!     created_at                  TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE earnings_call_transcripts (
//!     id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     ticker          TEXT NOT NULL,
//!     year            INT NOT NULL,
//!     quarter         INT NOT NULL,
//!     transcript_data JSONB NOT NULL,
//!     created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     UNIQUE (ticker, year, quarter)
//! );
//!
//! CREATE TABLE ticker_journals (
//!     id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     ticker     TEXT NOT NULL,
//!     entry_date DATE NOT NULL,
//!     content    TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     UNIQUE (ticker, entry_date)
//! );
//!
//! CREATE TABLE favorite_subreddits (
//!     id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     subreddit_name TEXT NOT NULL UNIQUE,
//!     active         BOOLEAN NOT NULL DEFAULT TRUE,
//!     created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

pub mod journal;
pub mod subreddit;
pub mod ticker_search;
pub mod transcript;

pub use journal::{JournalRecord, JournalRepository};
pub use subreddit::{normalize_subreddit_name, SubredditRecord, SubredditRepository};
pub use ticker_search::{SectionColumn, TickerSearchRecord, TickerSearchRepository};
pub use transcript::{TranscriptRecord, TranscriptRepository, TRANSCRIPT_FRESHNESS_DAYS};

/// PostgreSQL 고유 제약 조건 위반(23505) 여부 확인.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
