//! OpenAI 호환 chat completions 클라이언트.
//!
//! 텍스트 입력을 JSON 객체 응답으로 변환하는 최소 래퍼입니다.
//! 응답 본문은 호출자가 지정한 출력 타입으로 파싱됩니다.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{AgentError, Result};

/// chat completions 클라이언트.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

// ==================== 요청/응답 타입 ====================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl ChatClient {
    /// 새로운 클라이언트 생성.
    ///
    /// # Arguments
    /// * `api_key` - API 키
    /// * `model` - 모델 이름
    /// * `base_url` - API base URL (OpenAI 호환 서버)
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    /// 시스템 프롬프트와 입력 텍스트로 구조화 출력을 추출합니다.
    ///
    /// JSON 객체 형식을 요청하고 첫 번째 선택지의 내용을 `T`로
    /// 파싱합니다.
    ///
    /// # Errors
    /// 응답이 `T`의 스키마와 일치하지 않으면 `AgentError::Schema`를
    /// 반환합니다.
    pub async fn extract<T: DeserializeOwned>(&self, system: &str, input: &str) -> Result<T> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: input,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!(model = %self.model, input_len = input.len(), "Running agent extraction");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Schema(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AgentError::EmptyCompletion)?;

        serde_json::from_str(&content).map_err(|e| AgentError::Schema(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        verdict: String,
    }

    #[tokio::test]
    async fn test_extract_parses_first_choice() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [
                        { "message": { "content": "{\"verdict\":\"bullish\"}" } }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ChatClient::new("test-key", "test-model", server.url());
        let probe: Probe = client.extract("system", "input").await.unwrap();

        assert_eq!(probe.verdict, "bullish");
    }

    #[tokio::test]
    async fn test_extract_schema_mismatch() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [
                        { "message": { "content": "{\"unexpected\":true}" } }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ChatClient::new("test-key", "test-model", server.url());
        let err = client.extract::<Probe>("system", "input").await.unwrap_err();

        assert!(matches!(err, AgentError::Schema(_)));
    }

    #[tokio::test]
    async fn test_extract_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = ChatClient::new("test-key", "test-model", server.url());
        let err = client.extract::<Probe>("system", "input").await.unwrap_err();

        assert!(matches!(err, AgentError::Api { status: 429, .. }));
    }
}
