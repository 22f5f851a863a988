//! Tesseract CLI連携
//!
//! `tesseract stdin stdout -l <lang>` を子プロセスとして起動し、
//! 画像を標準入力に流して標準出力のテキストを受け取る。

use super::{report_progress, OcrEngine, ProgressFn};
use crate::config::Config;
use crate::error::{ReceiptAiError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

pub struct TesseractCli {
    command: String,
    language: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ocr_command.as_str(), config.ocr_language.as_str())
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &[u8], progress: ProgressFn<'_>) -> Result<String> {
        report_progress(progress, 0.0);

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReceiptAiError::Ocr(format!("{} 実行エラー: {}", self.command, e)))?;

        // 出力を読みながら書き込まないとパイプが詰まる
        if let Some(mut stdin) = child.stdin.take() {
            let bytes = image.to_vec();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&bytes).await {
                    debug!(error = %e, "OCRプロセスへの書き込み中断");
                }
            });
        }
        report_progress(progress, 0.5);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ReceiptAiError::Ocr(format!("{} 待機エラー: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReceiptAiError::Ocr(format!(
                "{} failed (code {:?}): {}",
                self.command,
                output.status.code(),
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(chars = text.len(), "OCR完了");
        report_progress(progress, 1.0);

        Ok(text)
    }
}
