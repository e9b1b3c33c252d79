//! Anthropic Messages API クライアント
//!
//! コンテンツブロック（画像 + テキスト）を送り、最初のテキストブロックを返す。
//! リトライはしない。タイムアウトは設定値。

use super::VisionModel;
use crate::config::Config;
use crate::error::{Result, TasteCheckError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tastecheck_common::{ContentBlock, VisionRequest};
use tracing::debug;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a [ContentBlock],
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Claude Vision クライアント
pub struct ClaudeClient {
    /// None の場合は呼び出し時に MissingApiKey
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl ClaudeClient {
    pub fn new(api_key: Option<String>, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TasteCheckError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            model: model.to_string(),
            endpoint: ANTHROPIC_API_URL.to_string(),
            client,
        })
    }

    /// 設定から生成（APIキーが無くてもエラーにしない）
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_api_key().ok(),
            &config.model,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// 送信先を差し替える（プロキシ・テスト用）
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, request: &VisionRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(TasteCheckError::MissingApiKey)?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: [Message {
                role: "user",
                content: &request.content,
            }],
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "Claude API 呼び出し");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TasteCheckError::ApiCall(format!(
                "Claude API error (HTTP {}): {}",
                status, error_text
            )));
        }

        let payload: MessagesResponse = response.json().await?;
        first_text(payload)
    }
}

fn first_text(payload: MessagesResponse) -> Result<String> {
    payload
        .content
        .into_iter()
        .find(|c| c.content_type == "text")
        .and_then(|c| c.text)
        .ok_or_else(|| TasteCheckError::ApiParse("no text content in Claude API response".into()))
}

impl VisionModel for ClaudeClient {
    async fn complete(&self, request: &VisionRequest) -> Result<String> {
        self.send(request).await
    }
}
