//! Receipt AI Common Library
//!
//! CLIとHTTPサーバーで共有される型と正規化ロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod coerce;
pub mod money;
pub mod parser;
pub mod prompts;

pub use types::{Amount, ChargeEntry, DegradedReceipt, LineItem, MoneyValue, Receipt, StructuredReceipt};
pub use error::{Error, Result};
pub use money::{format_charges, format_money, sum_charges};
pub use parser::{normalize, strip_code_fences, PARSE_FAILURE_MESSAGE};
pub use prompts::{build_extraction_prompt, EXAMPLE_RESPONSE};
