//! 金額の表示・集計ヘルパー
//!
//! 正規化済みの MoneyValue / ChargeEntry だけを扱う。
//! 形状の判定は coerce で済んでいるため、ここでは再判定しない。

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::types::{Amount, ChargeEntry, MoneyValue};

/// 値がないときの表示
pub const EMPTY_DISPLAY: &str = "-";

/// 金額として受け付ける絶対値の上限（10^15）
///
/// これを超える値は数値として扱わない。合計がオーバーフローしない範囲に収める。
pub const MAX_MAGNITUDE: Decimal =
    Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// 上限以内の値だけを返す
pub(crate) fn within_range(value: Decimal) -> Option<Decimal> {
    (value.abs() <= MAX_MAGNITUDE).then_some(value)
}

/// 文字列を金額として解釈
///
/// 受け付ける形式: 前後空白、先頭の `-`、`$`、桁区切りの `,`。
/// それ以外の文字を含む場合と、絶対値が `MAX_MAGNITUDE` を超える場合は None。
///
/// # Examples
/// ```
/// use receipt_ai_common::money::parse_decimal;
///
/// assert_eq!(parse_decimal(" $1,234.50 ").unwrap().to_string(), "1234.50");
/// assert!(parse_decimal("8%").is_none());
/// ```
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let mut s = text.trim();
    let negative = s.starts_with('-');
    if negative {
        s = s[1..].trim_start();
    }
    s = s.strip_prefix('$').unwrap_or(s).trim_start();

    let digits: String = s.chars().filter(|&c| c != ',').collect();
    if digits.is_empty()
        || !digits.chars().any(|c| c.is_ascii_digit())
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        || digits.matches('.').count() > 1
    {
        return None;
    }

    let value = within_range(Decimal::from_str(&digits).ok()?)?;
    Some(if negative { -value } else { value })
}

impl Amount {
    /// 集計用の数値（解釈できない文字列は0）
    pub fn numeric(&self) -> Decimal {
        match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => parse_decimal(s).unwrap_or(Decimal::ZERO),
        }
    }

    fn display(&self) -> String {
        match self {
            Amount::Number(n) => two_decimals(*n),
            Amount::Text(s) => s.clone(),
        }
    }
}

impl MoneyValue {
    /// 集計用の数値（解釈できない文字列は0）
    pub fn numeric(&self) -> Decimal {
        match self {
            MoneyValue::Number(n) => *n,
            MoneyValue::Text(s) => parse_decimal(s).unwrap_or(Decimal::ZERO),
            MoneyValue::Tagged { amount, .. } => amount.numeric(),
        }
    }
}

fn two_decimals(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// 金額を表示用文字列に変換
///
/// - 数値: 小数点以下2桁
/// - "USD" 付き: `$` を前置
/// - その他のラベル付き: ` <ラベル>` を後置
/// - 文字列: そのまま
/// - なし: `-`
pub fn format_money(value: Option<&MoneyValue>) -> String {
    match value {
        None => EMPTY_DISPLAY.to_string(),
        Some(MoneyValue::Number(n)) => two_decimals(*n),
        Some(MoneyValue::Text(s)) => s.clone(),
        Some(MoneyValue::Tagged { label, amount }) => {
            if label.trim().eq_ignore_ascii_case("USD") {
                format!("${}", amount.display())
            } else {
                format!("{} {}", amount.display(), label)
            }
        }
    }
}

/// 税・割引の一覧を表示用文字列に変換
///
/// 各要素を `<種別>: <金額>` とし `, ` で連結する。種別がない要素は金額のみ。
pub fn format_charges(entries: Option<&[ChargeEntry]>) -> String {
    let entries = match entries {
        Some(e) if !e.is_empty() => e,
        _ => return EMPTY_DISPLAY.to_string(),
    };

    entries
        .iter()
        .map(|entry| {
            let amount = format_money(Some(&entry.amount));
            match entry.kind.as_deref() {
                Some(kind) => format!("{}: {}", kind, amount),
                None => amount,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// 税・割引の合計
///
/// なし・空配列は0。各金額は `MAX_MAGNITUDE` 以内なので、順序に依存しない。
pub fn sum_charges(entries: Option<&[ChargeEntry]>) -> Decimal {
    entries
        .unwrap_or_default()
        .iter()
        .map(|entry| entry.amount.numeric())
        .fold(Decimal::ZERO, |acc, n| acc.saturating_add(n))
}
