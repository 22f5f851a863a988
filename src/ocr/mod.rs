//! OCR連携
//!
//! 画像バイト列からレシートのテキストを得る外部サービスとの境界。
//! 言語ヒントは英語固定。進捗は 0.0〜1.0 でコールバックに通知する。

mod tesseract;

pub use tesseract::TesseractCli;

use crate::error::Result;
use async_trait::async_trait;

/// 進捗コールバック（0.0〜1.0）
pub type ProgressFn<'a> = &'a (dyn Fn(f32) + Send + Sync);

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8], progress: ProgressFn<'_>) -> Result<String>;
}

/// 範囲外の値を丸めて通知
pub(crate) fn report_progress(progress: ProgressFn<'_>, value: f32) {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    progress(value);
}
