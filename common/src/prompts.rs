//! プロンプト生成モジュール
//!
//! レシート抽出用プロンプトを組み立てる:
//! - RECEIPT_FIELDS: 出力フィールドと型の一覧
//! - EXAMPLE_RESPONSE: 出力例（1件の完全なJSON）
//! - build_extraction_prompt: OCRテキストを埋め込んだプロンプト

/// 出力フィールド（名前, 型と制約）
pub const RECEIPT_FIELDS: &[(&str, &str)] = &[
    ("merchant", "string - the store or business name"),
    ("date", "string - purchase date formatted as YYYY-MM-DD, or \"Unknown\" if not found"),
    ("total", "number - the final amount paid, as a bare number without currency symbols"),
    ("items", "array of objects with name (string), price (number) and quantity (integer, default 1)"),
    ("paymentMethod", "string - e.g. \"Cash\", \"Credit Card\", \"VISA\""),
    ("taxes", "array of objects with type (string) and amount (bare number)"),
    ("discounts", "array of objects with type (string) and amount (bare number)"),
];

/// 出力例
pub const EXAMPLE_RESPONSE: &str = r#"{
  "merchant": "Store Name",
  "date": "2023-04-15",
  "total": 42.99,
  "items": [
    {"name": "Item 1", "price": 10.99, "quantity": 1},
    {"name": "Item 2", "price": 15.99, "quantity": 2}
  ],
  "paymentMethod": "Credit Card",
  "taxes": [
    {"type": "Sales Tax", "amount": 3.45}
  ],
  "discounts": [
    {"type": "Coupon", "amount": 2.00}
  ]
}"#;

/// レシート抽出プロンプト生成
///
/// # Arguments
/// * `transcript` - OCRで得たレシートの生テキスト（加工せず埋め込む）
///
/// # Returns
/// 抽出用のプロンプト文字列
pub fn build_extraction_prompt(transcript: &str) -> String {
    let field_list = RECEIPT_FIELDS
        .iter()
        .map(|(name, desc)| format!("- {}: {}", name, desc))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a receipt data extraction assistant. The following text was read from a purchase receipt by OCR and may contain misreads, broken spacing and store-specific formatting.

## Receipt text
{transcript}

## Fields to extract
{field_list}

## Rules
- Every amount (total, price, taxes, discounts) is a currency amount, never a percentage rate. If only a tax rate is printed, compute the currency amount when possible; otherwise omit the entry.
- Use numbers for amounts, not strings. Do not include currency symbols.
- Omit a field entirely if it cannot be found, except date which is "Unknown".
- Keep item names as printed, fixing only obvious OCR errors.

## Example response
{EXAMPLE_RESPONSE}

Return ONLY the JSON object. No explanations, no prose, no markdown code fences."#
    )
}
