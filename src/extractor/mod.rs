//! 抽出リクエスト
//!
//! OCRテキストからプロンプトを組み立て、生成AIに送り、応答テキストを
//! 加工せずに返す。パースと正規化は receipt_ai_common::normalize で行う。

mod gemini;

pub use gemini::{GeminiClient, GenerationConfig};

use crate::error::Result;
use async_trait::async_trait;
use receipt_ai_common::build_extraction_prompt;
use std::sync::Arc;
use tracing::debug;

/// テキスト生成サービス
///
/// 非2xx応答は `Upstream`、無応答は `Network` / `Timeout` として返す。
/// 内部でリトライしない。
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// プロンプト生成 + 1回の呼び出し
#[derive(Clone)]
pub struct Extractor {
    client: Arc<dyn CompletionClient>,
}

impl Extractor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// OCRテキストから生の応答テキストを取得
    ///
    /// 空テキストの検証は呼び出し側で行う。
    pub async fn extract(&self, transcript: &str) -> Result<String> {
        let prompt = build_extraction_prompt(transcript);
        debug!(prompt_len = prompt.len(), "抽出リクエスト送信");

        let completion = self.client.complete(&prompt).await?;
        debug!(completion_len = completion.len(), "抽出レスポンス受信");

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReceiptAiError;
    use std::sync::Mutex;

    struct RecordingClient {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(ReceiptAiError::Upstream {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_extract_returns_completion_unmodified() {
        let client = Arc::new(RecordingClient {
            prompts: Mutex::new(Vec::new()),
            reply: "```json\n{\"total\": 1}\n```".to_string(),
        });
        let extractor = Extractor::new(client.clone());

        let raw = extractor.extract("Total $1.00").await.unwrap();
        assert_eq!(raw, "```json\n{\"total\": 1}\n```");

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Total $1.00"));
    }

    #[tokio::test]
    async fn test_extract_propagates_upstream_error() {
        let extractor = Extractor::new(Arc::new(FailingClient));
        let err = extractor.extract("Total $1.00").await.unwrap_err();
        assert!(matches!(err, ReceiptAiError::Upstream { status: 503, .. }));
    }
}
