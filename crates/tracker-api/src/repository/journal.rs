//! 매매일지 저장소.
//!
//! 티커당 하루 한 건의 일지를 관리합니다. 같은 날짜에 다시 저장하면
//! 내용이 갱신됩니다 (`UNIQUE (ticker, entry_date)` upsert).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// 일지 레코드.
#[derive(Debug, Clone, FromRow, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct JournalRecord {
    pub id: Uuid,
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 일지 저장소.
pub struct JournalRepository;

impl JournalRepository {
    /// 일지 삽입/갱신 (upsert on (ticker, entry_date)).
    pub async fn upsert(
        pool: &PgPool,
        ticker: &str,
        entry_date: NaiveDate,
        content: &str,
    ) -> Result<JournalRecord, sqlx::Error> {
        sqlx::query_as::<_, JournalRecord>(
            r#"
            INSERT INTO ticker_journals (ticker, entry_date, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (ticker, entry_date) DO UPDATE SET
                content = EXCLUDED.content,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(ticker)
        .bind(entry_date)
        .bind(content)
        .fetch_one(pool)
        .await
    }

    /// 티커의 모든 일지 조회 (날짜 내림차순).
    pub async fn list_for_ticker(
        pool: &PgPool,
        ticker: &str,
    ) -> Result<Vec<JournalRecord>, sqlx::Error> {
        sqlx::query_as::<_, JournalRecord>(
            r#"
            SELECT * FROM ticker_journals
            WHERE ticker = $1
            ORDER BY entry_date DESC
            "#,
        )
        .bind(ticker)
        .fetch_all(pool)
        .await
    }

    /// 특정 날짜의 일지 조회.
    pub async fn find_for_date(
        pool: &PgPool,
        ticker: &str,
        entry_date: NaiveDate,
    ) -> Result<Option<JournalRecord>, sqlx::Error> {
        sqlx::query_as::<_, JournalRecord>(
            r#"
            SELECT * FROM ticker_journals
            WHERE ticker = $1 AND entry_date = $2
            "#,
        )
        .bind(ticker)
        .bind(entry_date)
        .fetch_optional(pool)
        .await
    }

    /// 티커 범위 내에서 id로 삭제.
    ///
    /// 다른 티커의 일지는 id가 맞아도 삭제되지 않습니다.
    pub async fn delete(pool: &PgPool, ticker: &str, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM ticker_journals WHERE id = $1 AND ticker = $2",
        )
        .bind(id)
        .bind(ticker)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
