//! レシート抽出結果の型定義
//!
//! CLIとHTTPサーバーで共有される型:
//! - MoneyValue: 金額（数値 / 文字列 / 通貨・種別付き）
//! - LineItem: 明細行
//! - ChargeEntry: 税・割引の1件
//! - StructuredReceipt: 最終出力（解析成功 or 生テキスト退避）

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::coerce;
use crate::money::sum_charges;

/// 金額の値
///
/// AIの出力形式は揺れるため、正規化時に3つの表現のどれかに確定させる。
#[derive(Debug, Clone, PartialEq)]
pub enum MoneyValue {
    /// 数値として解釈できた金額
    Number(Decimal),
    /// 数値として解釈できなかった文字列（そのまま保持）
    Text(String),
    /// 通貨コードまたは種別ラベル付きの金額（例: "USD", "Sales Tax"）
    Tagged { label: String, amount: Amount },
}

/// ラベル付き金額の中身
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Number(Decimal),
    Text(String),
}

impl MoneyValue {
    /// 数値から生成
    pub fn number(value: Decimal) -> Self {
        MoneyValue::Number(value)
    }

    /// ラベル付き金額を生成
    pub fn tagged(label: impl Into<String>, amount: Amount) -> Self {
        MoneyValue::Tagged {
            label: label.into(),
            amount,
        }
    }
}

impl From<Amount> for MoneyValue {
    fn from(amount: Amount) -> Self {
        match amount {
            Amount::Number(n) => MoneyValue::Number(n),
            Amount::Text(s) => MoneyValue::Text(s),
        }
    }
}

fn decimal_to_json(value: &Decimal) -> serde_json::Value {
    // 表示用の小数表現をそのままJSON数値に載せる
    value
        .normalize()
        .to_string()
        .parse::<serde_json::Number>()
        .ok()
        .or_else(|| value.to_f64().and_then(serde_json::Number::from_f64))
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(value.to_string()))
}

impl Amount {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Amount::Number(n) => decimal_to_json(n),
            Amount::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl MoneyValue {
    /// JSON表現に変換（Tagged は `{type, amount}` 形式）
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            MoneyValue::Number(n) => decimal_to_json(n),
            MoneyValue::Text(s) => serde_json::Value::String(s.clone()),
            MoneyValue::Tagged { label, amount } => serde_json::json!({
                "type": label,
                "amount": amount.to_json(),
            }),
        }
    }
}

impl Serialize for MoneyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MoneyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        coerce::money(&value)
            .ok_or_else(|| serde::de::Error::custom("金額がnullです"))
    }
}

/// 明細行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<MoneyValue>,

    /// 1以上。None または 1 のときは数量表示なし
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl LineItem {
    /// 表示用の品名（数量が2以上なら ` x<数量>` を付与）
    ///
    /// 価格は受け取ったまま。単価か行合計かはここでは判断しない。
    pub fn display_name(&self) -> String {
        match self.quantity {
            Some(q) if q > 1 => format!("{} x{}", self.name, q),
            _ => self.name.clone(),
        }
    }
}

/// 税・割引の1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub amount: MoneyValue,
}

impl ChargeEntry {
    pub fn new(kind: Option<String>, amount: MoneyValue) -> Self {
        Self { kind, amount }
    }

    /// 金額ではなく税率が入っていそうか
    ///
    /// 種別名に `%` を含む、または文字列金額が `%` で終わる場合。
    /// 金額は常に通貨額として扱い、ここでは警告用の判定だけ行う。
    pub fn looks_like_rate(&self) -> bool {
        let kind_has_percent = self.kind.as_deref().is_some_and(|k| k.contains('%'));
        let amount_is_percent = match &self.amount {
            MoneyValue::Text(s) | MoneyValue::Tagged { amount: Amount::Text(s), .. } => {
                s.trim_end().ends_with('%')
            }
            _ => false,
        };
        kind_has_percent || amount_is_percent
    }
}

/// 解析に成功したレシート
///
/// 各フィールドは個別に省略可能。省略は「不明」を意味し、推測値は入れない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    /// `YYYY-MM-DD` または "Unknown"（受け取ったまま）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<MoneyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Vec<ChargeEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Vec<ChargeEntry>>,
}

impl Receipt {
    /// 日付を `YYYY-MM-DD` として解釈（"Unknown" 等は None）
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?.trim();
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    /// 税の合計
    pub fn tax_total(&self) -> Decimal {
        sum_charges(self.taxes.as_deref())
    }

    /// 割引の合計
    pub fn discount_total(&self) -> Decimal {
        sum_charges(self.discounts.as_deref())
    }
}

/// JSONとして解釈できなかった応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DegradedReceipt {
    /// AIの応答テキスト（加工前）
    pub raw: String,
    pub error: String,
}

/// 正規化の最終出力
///
/// 部分的な退避は存在しない。解析成功か、raw/error のみのどちらか。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredReceipt {
    Degraded(DegradedReceipt),
    Parsed(Receipt),
}

impl StructuredReceipt {
    pub fn is_degraded(&self) -> bool {
        matches!(self, StructuredReceipt::Degraded(_))
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            StructuredReceipt::Parsed(r) => Some(r),
            StructuredReceipt::Degraded(_) => None,
        }
    }
}
