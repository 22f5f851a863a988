//! AIレスポンスパーサー
//!
//! 生成AIの応答からコードフェンスを除去してJSONとして解釈し、
//! StructuredReceipt に正規化する。失敗は外に出さず、生テキスト退避に落とす。

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::coerce;
use crate::error::{Error, Result};
use crate::types::{DegradedReceipt, Receipt, StructuredReceipt};

/// JSONとして解釈できなかったときのエラーメッセージ
pub const PARSE_FAILURE_MESSAGE: &str = "Could not parse structured data";

/// コードフェンス（```json / ```）と前後の空白を除去
///
/// # Examples
/// ```
/// use receipt_ai_common::strip_code_fences;
///
/// let response = "```json\n{\"total\": 1}\n```";
/// assert_eq!(strip_code_fences(response), "{\"total\": 1}");
/// ```
pub fn strip_code_fences(response: &str) -> String {
    response
        .replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn parse_object(response: &str) -> Result<Map<String, Value>> {
    let json_str = strip_code_fences(response);
    match serde_json::from_str::<Value>(&json_str)? {
        Value::Object(obj) => Ok(obj),
        other => Err(Error::Parse(format!(
            "JSONオブジェクトではありません: {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn warn_rate_like_charges(receipt: &Receipt) {
    let groups = [("taxes", &receipt.taxes), ("discounts", &receipt.discounts)];
    for (field, entries) in groups {
        for entry in entries.iter().flatten().filter(|e| e.looks_like_rate()) {
            warn!(
                field,
                kind = entry.kind.as_deref().unwrap_or(""),
                "税率の可能性がある金額。通貨額として扱います"
            );
        }
    }
}

/// AIの応答を StructuredReceipt に正規化
///
/// 1. コードフェンスを除去
/// 2. 厳密にJSONとしてパース（失敗時は raw/error のみの退避レコード）
/// 3. taxes / discounts / items を配列形式に整形、金額を正規形に変換
///
/// 失敗しない。JSONの部分的な修復は行わない。
pub fn normalize(response: &str) -> StructuredReceipt {
    match parse_object(response) {
        Ok(obj) => {
            let receipt = coerce::receipt(&obj);
            warn_rate_like_charges(&receipt);
            StructuredReceipt::Parsed(receipt)
        }
        Err(e) => {
            debug!(error = %e, len = response.len(), "応答をJSONとして解釈できません");
            StructuredReceipt::Degraded(DegradedReceipt {
                raw: response.to_string(),
                error: PARSE_FAILURE_MESSAGE.to_string(),
            })
        }
    }
}
