//! 실적발표 녹취록 저장소.
//!
//! `(ticker, year, quarter)` 단위로 녹취록을 캐시합니다.
//! 30일 이내의 행은 신선한 것으로 보고 업스트림 재조회를 생략합니다.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// 녹취록이 신선하다고 보는 기간 (일).
pub const TRANSCRIPT_FRESHNESS_DAYS: i64 = 30;

/// 녹취록 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct TranscriptRecord {
    pub id: Uuid,
    pub ticker: String,
    pub year: i32,
    pub quarter: i32,
    pub transcript_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranscriptRecord {
    /// 주어진 시점 기준으로 캐시가 신선한지 확인합니다.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < Duration::days(TRANSCRIPT_FRESHNESS_DAYS)
    }
}

/// 녹취록 저장소.
pub struct TranscriptRepository;

impl TranscriptRepository {
    /// 특정 연도/분기의 녹취록 조회.
    pub async fn find(
        pool: &PgPool,
        ticker: &str,
        year: i32,
        quarter: i32,
    ) -> Result<Option<TranscriptRecord>, sqlx::Error> {
        sqlx::query_as::<_, TranscriptRecord>(
            r#"
            SELECT * FROM earnings_call_transcripts
            WHERE ticker = $1 AND year = $2 AND quarter = $3
            "#,
        )
        .bind(ticker)
        .bind(year)
        .bind(quarter)
        .fetch_optional(pool)
        .await
    }

    /// 티커의 모든 녹취록 조회.
    pub async fn list_for_ticker(
        pool: &PgPool,
        ticker: &str,
    ) -> Result<Vec<TranscriptRecord>, sqlx::Error> {
        sqlx::query_as::<_, TranscriptRecord>(
            r#"
            SELECT * FROM earnings_call_transcripts
            WHERE ticker = $1
            ORDER BY year DESC, quarter DESC
            "#,
        )
        .bind(ticker)
        .fetch_all(pool)
        .await
    }

    /// 녹취록 삽입/갱신 (upsert).
    pub async fn upsert(
        pool: &PgPool,
        ticker: &str,
        year: i32,
        quarter: i32,
        transcript_data: &Value,
    ) -> Result<TranscriptRecord, sqlx::Error> {
        sqlx::query_as::<_, TranscriptRecord>(
            r#"
            INSERT INTO earnings_call_transcripts (ticker, year, quarter, transcript_data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (ticker, year, quarter) DO UPDATE SET
                transcript_data = EXCLUDED.transcript_data,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(ticker)
        .bind(year)
        .bind(quarter)
        .bind(transcript_data)
        .fetch_one(pool)
        .await
    }
}
