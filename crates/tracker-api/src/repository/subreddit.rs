//! 즐겨찾기 서브레딧 저장소.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// 서브레딧 레코드.
#[derive(Debug, Clone, FromRow, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct SubredditRecord {
    pub id: Uuid,
    pub subreddit_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 서브레딧 이름을 정규화합니다.
///
/// 공백 제거, 소문자화, 선행 `r/` 제거. 결과가 비면 None.
pub fn normalize_subreddit_name(raw: &str) -> Option<String> {
    let cleaned = raw.trim().to_lowercase();
    let cleaned = cleaned.strip_prefix("r/").unwrap_or(&cleaned);

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// 서브레딧 저장소.
pub struct SubredditRepository;

impl SubredditRepository {
    /// 활성 서브레딧 목록 조회 (이름 오름차순).
    pub async fn list_active(pool: &PgPool) -> Result<Vec<SubredditRecord>, sqlx::Error> {
        sqlx::query_as::<_, SubredditRecord>(
            r#"
            SELECT * FROM favorite_subreddits
            WHERE active = TRUE
            ORDER BY subreddit_name
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// 서브레딧 추가.
    ///
    /// 중복 이름은 고유 제약 위반(23505)으로 실패합니다.
    pub async fn insert(pool: &PgPool, name: &str) -> Result<SubredditRecord, sqlx::Error> {
        sqlx::query_as::<_, SubredditRecord>(
            r#"
            INSERT INTO favorite_subreddits (subreddit_name, active)
            VALUES ($1, TRUE)
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// 서브레딧 이름 변경.
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        name: &str,
    ) -> Result<Option<SubredditRecord>, sqlx::Error> {
        sqlx::query_as::<_, SubredditRecord>(
            r#"
            UPDATE favorite_subreddits
            SET subreddit_name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// 활성 상태 토글.
    pub async fn toggle(pool: &PgPool, id: Uuid) -> Result<Option<SubredditRecord>, sqlx::Error> {
        sqlx::query_as::<_, SubredditRecord>(
            r#"
            UPDATE favorite_subreddits
            SET active = NOT active, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// id로 삭제.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorite_subreddits WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
