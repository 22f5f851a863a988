//! 抽出結果のテキスト表示
//!
//! 金額の表示は receipt_ai_common::money のヘルパーだけを使う。

use receipt_ai_common::money::{format_charges, format_money, EMPTY_DISPLAY};
use receipt_ai_common::{Receipt, StructuredReceipt};

const LABEL_WIDTH: usize = 10;
const ITEM_NAME_WIDTH: usize = 28;
const ITEM_PRICE_WIDTH: usize = 10;

fn line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{:<width$}{}\n", label, value, width = LABEL_WIDTH));
}

fn text_or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => EMPTY_DISPLAY,
    }
}

fn render_receipt(receipt: &Receipt) -> String {
    let mut out = String::new();

    line(&mut out, "Merchant", text_or_dash(receipt.merchant.as_deref()));
    line(&mut out, "Date", text_or_dash(receipt.date.as_deref()));
    line(&mut out, "Payment", text_or_dash(receipt.payment_method.as_deref()));

    match receipt.items.as_deref() {
        Some(items) if !items.is_empty() => {
            out.push_str("Items\n");
            for item in items {
                out.push_str(&format!(
                    "  {:<name$}{:>price$}\n",
                    item.display_name(),
                    format_money(item.price.as_ref()),
                    name = ITEM_NAME_WIDTH,
                    price = ITEM_PRICE_WIDTH,
                ));
            }
        }
        _ => line(&mut out, "Items", EMPTY_DISPLAY),
    }

    line(&mut out, "Taxes", &format_charges(receipt.taxes.as_deref()));
    if receipt.taxes.as_ref().is_some_and(|t| t.len() > 1) {
        line(&mut out, "", &format!("(sum {:.2})", receipt.tax_total()));
    }
    line(&mut out, "Discounts", &format_charges(receipt.discounts.as_deref()));
    if receipt.discounts.as_ref().is_some_and(|d| d.len() > 1) {
        line(&mut out, "", &format!("(sum {:.2})", receipt.discount_total()));
    }
    line(&mut out, "Total", &format_money(receipt.total.as_ref()));

    out
}

/// StructuredReceipt を表示用テキストに変換
pub fn render(result: &StructuredReceipt) -> String {
    match result {
        StructuredReceipt::Parsed(receipt) => render_receipt(receipt),
        StructuredReceipt::Degraded(degraded) => {
            format!("⚠ {}\n--- raw ---\n{}\n", degraded.error, degraded.raw.trim_end())
        }
    }
}
