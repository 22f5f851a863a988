//! フィールド形状の正規化
//!
//! AIが返すJSONの各フィールドを、型定義の正規形に1回だけ変換する。
//! フィールドごとに独立して処理し、壊れた値は捨てるか文字列として保持する。

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::money::{parse_decimal, within_range};
use crate::types::{Amount, ChargeEntry, LineItem, MoneyValue, Receipt};

/// ラベルとして扱うキー（優先順）
const LABEL_KEYS: &[&str] = &["type", "currency"];

fn json_number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    let s = n.to_string();
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
        .or_else(|| n.as_f64().and_then(Decimal::from_f64))
        .and_then(within_range)
}

fn amount(value: &Value) -> Option<Amount> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(match json_number_to_decimal(n) {
            Some(d) => Amount::Number(d),
            None => Amount::Text(n.to_string()),
        }),
        Value::String(s) => Some(match parse_decimal(s) {
            Some(d) => Amount::Number(d),
            None => Amount::Text(s.clone()),
        }),
        Value::Object(obj) => obj.get("amount").and_then(amount),
        other => Some(Amount::Text(other.to_string())),
    }
}

fn label(obj: &Map<String, Value>) -> Option<String> {
    LABEL_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(text)
}

/// 金額フィールドを正規化
///
/// - 数値 → Number
/// - 数値として読める文字列 → Number、読めない文字列 → Text
/// - `{type|currency, amount}` → Tagged（ラベルなしなら中身の金額）
/// - その他 → JSON表現の Text
/// - null → None
pub fn money(value: &Value) -> Option<MoneyValue> {
    match value {
        Value::Object(obj) if obj.contains_key("amount") => {
            let inner = amount(obj.get("amount")?)?;
            Some(match label(obj) {
                Some(l) => MoneyValue::Tagged { label: l, amount: inner },
                None => inner.into(),
            })
        }
        Value::Object(_) | Value::Array(_) => Some(MoneyValue::Text(value.to_string())),
        other => amount(other).map(MoneyValue::from),
    }
}

/// 文字列フィールドを正規化（数値・真偽値は文字列化、null は None）
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn charge_entry(value: &Value) -> Option<ChargeEntry> {
    match value {
        Value::Object(obj) => {
            let raw_amount = obj.get("amount")?;
            let kind = obj.get("type").and_then(text);
            let currency = obj.get("currency").and_then(text);

            // 種別がなければ通貨ラベル付きの金額として扱う
            let value = match (&kind, currency) {
                (None, _) => money(value)?,
                (Some(_), Some(label)) => MoneyValue::Tagged {
                    label,
                    amount: amount(raw_amount)?,
                },
                (Some(_), None) => money(raw_amount)?,
            };
            Some(ChargeEntry::new(kind, value))
        }
        Value::Number(_) => money(value).map(|m| ChargeEntry::new(None, m)),
        Value::String(s) => parse_decimal(s).map(|d| ChargeEntry::new(None, MoneyValue::Number(d))),
        _ => None,
    }
}

/// 税・割引フィールドを正規化
///
/// - 配列 → 要素ごとに変換（変換できない要素は除外）
/// - オブジェクト → 1要素の配列
/// - 数値（または数値文字列） → 種別なしの1要素
/// - その他のスカラー → 空配列
/// - null → None
pub fn charges(value: &Value) -> Option<Vec<ChargeEntry>> {
    match value {
        Value::Null => None,
        Value::Array(arr) => Some(arr.iter().filter_map(charge_entry).collect()),
        other => Some(charge_entry(other).into_iter().collect()),
    }
}

fn quantity(value: &Value) -> Option<u32> {
    let q = match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => u as f64,
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if q.is_finite() && q >= 1.0 && q.fract() == 0.0 && q <= u32::MAX as f64 {
        Some(q as u32)
    } else {
        None
    }
}

fn line_item(value: &Value) -> Option<LineItem> {
    match value {
        Value::Object(obj) => Some(LineItem {
            name: obj.get("name").and_then(text).unwrap_or_default(),
            price: obj.get("price").and_then(money),
            quantity: obj.get("quantity").and_then(quantity),
        }),
        Value::String(s) => Some(LineItem {
            name: s.clone(),
            ..Default::default()
        }),
        _ => None,
    }
}

/// 明細フィールドを正規化（配列でなければ1要素の配列に包む）
pub fn items(value: &Value) -> Option<Vec<LineItem>> {
    match value {
        Value::Null => None,
        Value::Array(arr) => Some(arr.iter().filter_map(line_item).collect()),
        other => Some(line_item(other).into_iter().collect()),
    }
}

/// JSONオブジェクト全体をレシートに変換
///
/// 存在しないフィールドは None のまま。値を補完しない。
pub fn receipt(obj: &Map<String, Value>) -> Receipt {
    Receipt {
        merchant: obj.get("merchant").and_then(text),
        date: obj.get("date").and_then(text),
        total: obj.get("total").and_then(money),
        items: obj.get("items").and_then(items),
        payment_method: obj.get("paymentMethod").and_then(text),
        taxes: obj.get("taxes").and_then(charges),
        discounts: obj.get("discounts").and_then(charges),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // =============================================
    // money テスト
    // =============================================

    #[test]
    fn test_money_number_and_string() {
        assert_eq!(money(&json!(4.06)), Some(MoneyValue::Number(dec("4.06"))));
        assert_eq!(money(&json!(12)), Some(MoneyValue::Number(dec("12"))));
        assert_eq!(money(&json!("$4.06")), Some(MoneyValue::Number(dec("4.06"))));
        assert_eq!(
            money(&json!("approx. 4")),
            Some(MoneyValue::Text("approx. 4".to_string()))
        );
        assert_eq!(money(&Value::Null), None);
    }

    #[test]
    fn test_money_out_of_range_becomes_text() {
        assert_eq!(
            money(&json!("79228162514264337593543950335")),
            Some(MoneyValue::Text("79228162514264337593543950335".to_string()))
        );
        assert!(matches!(money(&json!(1e20)), Some(MoneyValue::Text(_))));
        assert!(charges(&json!(["79228162514264337593543950335"])).unwrap().is_empty());
    }

    #[test]
    fn test_money_tagged_object() {
        assert_eq!(
            money(&json!({"type": "USD", "amount": 42.99})),
            Some(MoneyValue::tagged("USD", Amount::Number(dec("42.99"))))
        );
        assert_eq!(
            money(&json!({"currency": "EUR", "amount": "7,50 EUR"})),
            Some(MoneyValue::tagged("EUR", Amount::Text("7,50 EUR".to_string())))
        );
    }

    #[test]
    fn test_money_object_without_label_uses_amount() {
        assert_eq!(
            money(&json!({"amount": 3})),
            Some(MoneyValue::Number(dec("3")))
        );
        assert_eq!(money(&json!({"type": "USD", "amount": null})), None);
    }

    #[test]
    fn test_money_unexpected_shapes_become_text() {
        assert_eq!(
            money(&json!({"value": 3})),
            Some(MoneyValue::Text(r#"{"value":3}"#.to_string()))
        );
        assert_eq!(money(&json!(true)), Some(MoneyValue::Text("true".to_string())));
        assert_eq!(money(&json!([1, 2])), Some(MoneyValue::Text("[1,2]".to_string())));
    }

    // =============================================
    // charges テスト
    // =============================================

    #[test]
    fn test_charges_single_object_wrapped() {
        let result = charges(&json!({"type": "Sales Tax", "amount": 3.45})).unwrap();
        assert_eq!(
            result,
            vec![ChargeEntry::new(
                Some("Sales Tax".to_string()),
                MoneyValue::Number(dec("3.45"))
            )]
        );
    }

    #[test]
    fn test_charges_array_passthrough() {
        let result = charges(&json!([
            {"type": "State", "amount": 1.00},
            {"type": "City", "amount": "0.25"}
        ]))
        .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].amount, MoneyValue::Number(dec("0.25")));
    }

    #[test]
    fn test_charges_bare_number_is_untyped_entry() {
        let result = charges(&json!(0.56)).unwrap();
        assert_eq!(result, vec![ChargeEntry::new(None, MoneyValue::Number(dec("0.56")))]);
    }

    #[test]
    fn test_charges_currency_label_is_kept() {
        let result = charges(&json!({"currency": "USD", "amount": 5})).unwrap();
        assert_eq!(
            result,
            vec![ChargeEntry::new(
                None,
                MoneyValue::tagged("USD", Amount::Number(dec("5")))
            )]
        );

        let result = charges(&json!({"type": "Sales Tax", "currency": "USD", "amount": "0.56"})).unwrap();
        assert_eq!(result[0].kind.as_deref(), Some("Sales Tax"));
        assert_eq!(
            result[0].amount,
            MoneyValue::tagged("USD", Amount::Number(dec("0.56")))
        );
    }

    #[test]
    fn test_charges_malformed_scalar_is_empty() {
        assert_eq!(charges(&json!("included")), Some(vec![]));
        assert_eq!(charges(&json!(false)), Some(vec![]));
        assert_eq!(charges(&Value::Null), None);
    }

    #[test]
    fn test_charges_drops_unusable_elements() {
        let result = charges(&json!([
            {"type": "Coupon", "amount": 1.5},
            "n/a",
            {"type": "No amount"},
            2
        ]))
        .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].kind.as_deref(), Some("Coupon"));
        assert_eq!(result[1].kind, None);
    }

    // =============================================
    // items テスト
    // =============================================

    #[test]
    fn test_items_single_object_wrapped() {
        let result = items(&json!({"name": "Milk", "price": 3.5, "quantity": 2})).unwrap();
        assert_eq!(
            result,
            vec![LineItem {
                name: "Milk".to_string(),
                price: Some(MoneyValue::Number(dec("3.5"))),
                quantity: Some(2),
            }]
        );
    }

    #[test]
    fn test_items_quantity_coercion() {
        let result = items(&json!([
            {"name": "A", "quantity": 2.0},
            {"name": "B", "quantity": "3"},
            {"name": "C", "quantity": 0},
            {"name": "D", "quantity": 1.5},
            {"name": "E", "quantity": -1},
            {"name": "F"}
        ]))
        .unwrap();
        let quantities: Vec<Option<u32>> = result.iter().map(|i| i.quantity).collect();
        assert_eq!(quantities, vec![Some(2), Some(3), None, None, None, None]);
    }

    #[test]
    fn test_items_string_elements_and_missing_name() {
        let result = items(&json!(["Bread", {"price": 1}, 42])).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Bread");
        assert_eq!(result[1].name, "");
        assert_eq!(result[1].price, Some(MoneyValue::Number(dec("1"))));
    }

    // =============================================
    // receipt テスト
    // =============================================

    #[test]
    fn test_receipt_absent_fields_stay_absent() {
        let value = json!({"merchant": "STORE A"});
        let receipt = receipt(value.as_object().unwrap());
        assert_eq!(receipt.merchant.as_deref(), Some("STORE A"));
        assert!(receipt.date.is_none());
        assert!(receipt.total.is_none());
        assert!(receipt.items.is_none());
        assert!(receipt.taxes.is_none());
        assert!(receipt.discounts.is_none());
    }

    #[test]
    fn test_receipt_scalar_text_fields() {
        let value = json!({
            "merchant": 7,
            "date": "Unknown",
            "paymentMethod": null,
            "total": "12.00"
        });
        let receipt = receipt(value.as_object().unwrap());
        assert_eq!(receipt.merchant.as_deref(), Some("7"));
        assert_eq!(receipt.date.as_deref(), Some("Unknown"));
        assert!(receipt.payment_method.is_none());
        assert_eq!(receipt.total, Some(MoneyValue::Number(dec("12.00"))));
    }
}
