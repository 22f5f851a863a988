use thiserror::Error;

/// 接続失敗時に利用者へ返す文言（詳細はログのみ）
const NETWORK_USER_MESSAGE: &str = "抽出サービスに接続できませんでした。時間をおいて再試行してください";

#[derive(Error, Debug)]
pub enum ReceiptAiError {
    #[error("入力エラー: {0}")]
    Validation(String),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`receipt-ai config --set-api-key YOUR_KEY` または GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("抽出サービスがエラーを返しました (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("抽出サービスが{0}秒以内に応答しませんでした")]
    Timeout(u64),

    #[error("通信エラー: {0}")]
    Network(String),

    #[error("OCRエラー: {0}")]
    Ocr(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] receipt_ai_common::Error),
}

impl ReceiptAiError {
    /// HTTPステータスコード
    ///
    /// 上流のステータスはそのまま返す。タイムアウトは上流エラー扱いで504。
    pub fn status_code(&self) -> u16 {
        match self {
            ReceiptAiError::Validation(_) => 400,
            ReceiptAiError::Upstream { status, .. } => *status,
            ReceiptAiError::Timeout(_) => 504,
            _ => 500,
        }
    }

    /// 利用者向けの短いメッセージ
    pub fn user_message(&self) -> String {
        match self {
            ReceiptAiError::Network(_) => NETWORK_USER_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// 上流（抽出・OCRサービス）起因のエラーか
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ReceiptAiError::Upstream { .. } | ReceiptAiError::Timeout(_) | ReceiptAiError::Ocr(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReceiptAiError>;
