//! 티커 검색 레코드 저장소.
//!
//! `ticker_searches`는 티커별 수집 데이터를 한데 모으는 테이블입니다.
//! Reddit 통합 검색 데이터 외에 펀더멘털/뉴스/재무비율/실적발표
//! 섹션 컬럼을 함께 보관합니다.
//!
//! # 병합 정책
//!
//! 모든 쓰기 경로는 티커의 최신 행이 있으면 그 행에 병합하고,
//! 없으면 `data_version = 2` 행을 새로 만듭니다. 통합 검색 맵은
//! 서브레딧 키 단위 last-write-wins로 얕게 병합됩니다.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use tracker_core::domain::record::{SearchRecordData, UNIFIED_DATA_VERSION};
use tracker_core::domain::reddit::UnifiedSearchData;

/// 티커 검색 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct TickerSearchRecord {
    pub id: Uuid,
    pub ticker: String,

    // Legacy 형식 (data_version = 1)
    pub subreddit: Option<String>,
    pub search_data: Option<Value>,

    pub search_query: Option<String>,

    // 통합 형식 (data_version = 2)
    pub unified_search_data: Option<Value>,
    pub data_version: i32,

    // 섹션 컬럼
    pub fundamental_data: Option<Value>,
    pub fundamental_data_updated_at: Option<DateTime<Utc>>,
    pub news_data: Option<Value>,
    pub news_data_updated_at: Option<DateTime<Utc>>,
    pub liquidity_ratios_data: Option<Value>,
    pub liquidity_ratios_updated_at: Option<DateTime<Utc>>,
    pub credit_ratios_data: Option<Value>,
    pub credit_ratios_updated_at: Option<DateTime<Utc>>,
    pub earnings_calls_data: Option<Value>,
    pub earnings_calls_updated_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl TickerSearchRecord {
    /// 버전 판별자에 따라 검색 데이터 본문을 분류합니다.
    ///
    /// 검색 데이터가 없는 행(섹션 컬럼만 채워진 행)은 None.
    pub fn search_record_data(&self) -> Option<SearchRecordData> {
        if self.data_version >= UNIFIED_DATA_VERSION {
            let raw = self.unified_search_data.clone()?;
            let unified: UnifiedSearchData = serde_json::from_value(raw).ok()?;
            return Some(SearchRecordData::Unified(unified));
        }

        let subreddit = self.subreddit.clone()?;
        let posts = serde_json::from_value(self.search_data.clone()?).ok()?;
        Some(SearchRecordData::Legacy { subreddit, posts })
    }

    /// 검색 데이터를 통합 형식으로 반환합니다 (legacy 행은 변환).
    pub fn unified_data(&self) -> Option<UnifiedSearchData> {
        self.search_record_data()
            .map(|data| data.into_unified(&self.ticker, self.created_at))
    }
}

/// 섹션 컬럼 식별자.
///
/// 컬럼 이름은 쿼리에 정적으로 삽입되므로 이 enum을 거쳐야만
/// 갱신할 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionColumn {
    /// 펀더멘털 데이터
    Fundamental,
    /// 뉴스 데이터
    News,
    /// 유동성 비율
    LiquidityRatios,
    /// 신용 비율
    CreditRatios,
    /// 실적발표 목록
    EarningsCalls,
}

impl SectionColumn {
    /// 데이터 컬럼 이름.
    fn data_column(&self) -> &'static str {
        match self {
            SectionColumn::Fundamental => "fundamental_data",
            SectionColumn::News => "news_data",
            SectionColumn::LiquidityRatios => "liquidity_ratios_data",
            SectionColumn::CreditRatios => "credit_ratios_data",
            SectionColumn::EarningsCalls => "earnings_calls_data",
        }
    }

    /// 갱신 시각 컬럼 이름.
    fn updated_at_column(&self) -> &'static str {
        match self {
            SectionColumn::Fundamental => "fundamental_data_updated_at",
            SectionColumn::News => "news_data_updated_at",
            SectionColumn::LiquidityRatios => "liquidity_ratios_updated_at",
            SectionColumn::CreditRatios => "credit_ratios_updated_at",
            SectionColumn::EarningsCalls => "earnings_calls_updated_at",
        }
    }
}

/// 티커 검색 저장소.
pub struct TickerSearchRepository;

impl TickerSearchRepository {
    /// 티커의 가장 최근 레코드 조회.
    pub async fn latest_for_ticker(
        pool: &PgPool,
        ticker: &str,
    ) -> Result<Option<TickerSearchRecord>, sqlx::Error> {
        sqlx::query_as::<_, TickerSearchRecord>(
            r#"
            SELECT * FROM ticker_searches
            WHERE ticker = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(ticker)
        .fetch_optional(pool)
        .await
    }

    /// 티커의 모든 레코드 조회 (최신순).
    pub async fn list_for_ticker(
        pool: &PgPool,
        ticker: &str,
    ) -> Result<Vec<TickerSearchRecord>, sqlx::Error> {
        sqlx::query_as::<_, TickerSearchRecord>(
            r#"
            SELECT * FROM ticker_searches
            WHERE ticker = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(ticker)
        .fetch_all(pool)
        .await
    }

    /// 통합 검색 데이터를 저장합니다 (병합 정책 적용).
    ///
    /// 최신 행이 있으면 기존 통합 맵 위에 얕게 병합하여 갱신하고,
    /// 없으면 새 `data_version = 2` 행을 삽입합니다. legacy 최신
    /// 행도 병합 대상이며 그 행은 통합 형식으로 승격됩니다.
    pub async fn save_unified(
        pool: &PgPool,
        ticker: &str,
        search_query: &str,
        unified: &UnifiedSearchData,
    ) -> Result<Uuid, sqlx::Error> {
        let existing = Self::latest_for_ticker(pool, ticker).await?;

        match existing {
            Some(record) => {
                let merged = match record.unified_data() {
                    Some(previous) => unified.clone().merged_over(previous),
                    None => unified.clone(),
                };
                let payload = serde_json::to_value(&merged)
                    .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

                debug!(ticker, id = %record.id, "Merging unified search data into latest record");

                sqlx::query(
                    r#"
                    UPDATE ticker_searches
                    SET unified_search_data = $2,
                        data_version = $3,
                        search_query = $4
                    WHERE id = $1
                    "#,
                )
                .bind(record.id)
                .bind(payload)
                .bind(UNIFIED_DATA_VERSION)
                .bind(search_query)
                .execute(pool)
                .await?;

                Ok(record.id)
            }
            None => {
                let payload = serde_json::to_value(unified)
                    .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

                let id = sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO ticker_searches (ticker, search_query, unified_search_data, data_version)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(ticker)
                .bind(search_query)
                .bind(payload)
                .bind(UNIFIED_DATA_VERSION)
                .fetch_one(pool)
                .await?;

                Ok(id)
            }
        }
    }

    /// 섹션 컬럼을 저장합니다 (병합 정책 적용).
    ///
    /// 최신 행의 해당 컬럼을 덮어쓰고 갱신 시각을 올리거나,
    /// 행이 없으면 섹션만 채운 새 행을 삽입합니다.
    pub async fn save_section(
        pool: &PgPool,
        ticker: &str,
        section: SectionColumn,
        data: &Value,
    ) -> Result<Uuid, sqlx::Error> {
        let existing = Self::latest_for_ticker(pool, ticker).await?;

        match existing {
            Some(record) => {
                let query = format!(
                    "UPDATE ticker_searches SET {} = $2, {} = NOW() WHERE id = $1",
                    section.data_column(),
                    section.updated_at_column(),
                );

                sqlx::query(&query)
                    .bind(record.id)
                    .bind(data)
                    .execute(pool)
                    .await?;

                Ok(record.id)
            }
            None => {
                let query = format!(
                    r#"
                    INSERT INTO ticker_searches (ticker, {}, {}, data_version)
                    VALUES ($1, $2, NOW(), $3)
                    RETURNING id
                    "#,
                    section.data_column(),
                    section.updated_at_column(),
                );

                sqlx::query_scalar::<_, Uuid>(&query)
                    .bind(ticker)
                    .bind(data)
                    .bind(UNIFIED_DATA_VERSION)
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// 가장 최근의 펀더멘털 데이터 조회.
    pub async fn latest_fundamentals(
        pool: &PgPool,
        ticker: &str,
    ) -> Result<Option<(Value, Option<DateTime<Utc>>)>, sqlx::Error> {
        sqlx::query_as::<_, (Value, Option<DateTime<Utc>>)>(
            r#"
            SELECT fundamental_data, fundamental_data_updated_at
            FROM ticker_searches
            WHERE ticker = $1 AND fundamental_data IS NOT NULL
            ORDER BY fundamental_data_updated_at DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(ticker)
        .fetch_optional(pool)
        .await
    }

    /// 검색 이력 페이지 조회 (최신순). 전체 행 수를 함께 반환합니다.
    pub async fn history_page(
        pool: &PgPool,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<TickerSearchRecord>, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ticker_searches")
            .fetch_one(pool)
            .await?;

        let records = sqlx::query_as::<_, TickerSearchRecord>(
            r#"
            SELECT * FROM ticker_searches
            ORDER BY created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok((records, total))
    }

    /// id로 삭제.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ticker_searches WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
