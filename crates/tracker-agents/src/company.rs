//! 회사 기본 정보 요약 에이전트.

use serde::{Deserialize, Serialize};

use tracker_core::domain::fundamentals::FundamentalSnapshot;

use crate::client::ChatClient;
use crate::error::Result;

/// 에이전트 시스템 프롬프트.
const COMPANY_PROMPT: &str = r#"You are a financial data agent that takes in general information about a company and crafts a compact summary of the company.

Respond with a single JSON object: { "summary": string }"#;

/// 회사 요약 출력.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct CompanySummary {
    /// 한 단락 요약
    pub summary: String,
}

/// 회사 기본 정보 요약 에이전트.
pub struct CompanySummaryAgent {
    client: ChatClient,
}

impl CompanySummaryAgent {
    /// 새로운 에이전트 생성.
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    /// 펀더멘털 스냅샷의 일반 정보를 요약합니다.
    pub async fn run(&self, snapshot: &FundamentalSnapshot) -> Result<CompanySummary> {
        let input = format!(
            "Name: {}\nSector: {}\n\n{}",
            snapshot.name.as_deref().unwrap_or("unknown"),
            snapshot.sector.as_deref().unwrap_or("unknown"),
            snapshot.description.as_deref().unwrap_or(""),
        );

        self.client.extract(COMPANY_PROMPT, &input).await
    }
}
