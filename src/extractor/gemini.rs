//! Gemini API連携
//!
//! generateContent エンドポイントにテキストのみのプロンプトを送る。
//! 生成パラメータは低ランダム固定。

use super::CompletionClient;
use crate::config::Config;
use crate::error::{ReceiptAiError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// エラー本文を保持する最大文字数
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// 生成パラメータ
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_k: 1,
            top_p: 0.1,
            max_output_tokens: 1024,
        }
    }
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// エラーレスポンス `{ "error": { "message": ... } }`
#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout_seconds: u64,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ReceiptAiError::Config(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            timeout_seconds,
            generation: GenerationConfig::default(),
        })
    }

    /// 設定ファイル + 環境変数から生成
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Self::new(
            config.api_base_url.as_str(),
            config.model.as_str(),
            api_key,
            config.timeout_seconds,
        )
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn transport_error(&self, e: reqwest::Error) -> ReceiptAiError {
        if e.is_timeout() {
            warn!(timeout_seconds = self.timeout_seconds, "Gemini API タイムアウト");
            ReceiptAiError::Timeout(self.timeout_seconds)
        } else {
            warn!(error = %e, "Gemini API 通信エラー");
            ReceiptAiError::Network(e.to_string())
        }
    }
}

fn upstream_message(body: &str) -> String {
    match serde_json::from_str::<GeminiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: &self.generation,
        };

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = upstream_message(&body);
            warn!(status = status.as_u16(), %message, "Gemini API エラー応答");
            return Err(ReceiptAiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let response: GeminiResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                ReceiptAiError::Upstream {
                    status: 502,
                    message: format!("不正な応答形式: {}", e),
                }
            }
        })?;

        let text: String = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ReceiptAiError::Upstream {
                status: 502,
                message: "Empty response".to_string(),
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_defaults_are_low_randomness() {
        let config = GenerationConfig::default();
        assert!(config.temperature <= 0.2);
        assert_eq!(config.top_k, 1);
        assert!(config.max_output_tokens > 0);
    }

    #[test]
    fn test_generation_config_serialize_camel_case() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert!(json.get("topK").is_some());
        assert!(json.get("topP").is_some());
        assert!(json.get("maxOutputTokens").is_some());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new("http://localhost:9/v1beta/", "gemini-test", "k", 5).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_upstream_message_prefers_json_detail() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(upstream_message(body), "API key not valid");
        assert_eq!(upstream_message("Service Unavailable"), "Service Unavailable");
    }
}
