//! 抽出パイプライン
//!
//! OCRテキスト → 抽出リクエスト → 応答正規化 → StructuredReceipt
//!
//! 空テキストはネットワーク呼び出し前に弾く。結果は最新結果スロットに
//! 世代番号付きで反映し、古いリクエストの結果で上書きしない。

use crate::config::Config;
use crate::error::{ReceiptAiError, Result};
use crate::extractor::{Extractor, GeminiClient};
use crate::session::ReceiptSession;
use receipt_ai_common::{normalize, StructuredReceipt};
use std::sync::Arc;
use tracing::{debug, info};

/// OCRテキストの検証（前後空白を除いて空ならエラー）
pub fn validate_transcript(text: &str) -> Result<&str> {
    if text.trim().is_empty() {
        return Err(ReceiptAiError::Validation("テキストが空です".into()));
    }
    Ok(text)
}

#[derive(Clone)]
pub struct ReceiptPipeline {
    extractor: Extractor,
    session: Arc<ReceiptSession>,
}

impl ReceiptPipeline {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            session: Arc::new(ReceiptSession::new()),
        }
    }

    /// Gemini クライアントで構築（APIキー必須）
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiClient::from_config(config)?;
        Ok(Self::new(Extractor::new(Arc::new(client))))
    }

    pub fn session(&self) -> &ReceiptSession {
        &self.session
    }

    /// OCRテキストを構造化
    ///
    /// 正規化は失敗しない。エラーになるのは入力検証と通信・上流エラーのみ。
    pub async fn run(&self, transcript: &str) -> Result<StructuredReceipt> {
        let transcript = validate_transcript(transcript)?;
        let ticket = self.session.begin(transcript);

        let raw = self.extractor.extract(transcript).await?;
        let result = normalize(&raw);

        if self.session.complete(ticket, result.clone()) {
            info!(
                generation = ticket.generation(),
                degraded = result.is_degraded(),
                "抽出完了"
            );
        } else {
            debug!(generation = ticket.generation(), "新しいリクエストがあるため結果を破棄");
        }

        Ok(result)
    }

    /// 直前のOCRテキストで再解析
    pub async fn reanalyze(&self) -> Result<StructuredReceipt> {
        let transcript = self
            .session
            .transcript()
            .ok_or_else(|| ReceiptAiError::Validation("再解析するテキストがありません".into()))?;
        self.run(&transcript).await
    }

    pub fn latest(&self) -> Option<StructuredReceipt> {
        self.session.latest()
    }
}
