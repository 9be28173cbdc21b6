#![allow(dead_code)]
use byproject_core::{CurrencyCode, ExchangeRateRow, ExchangeRateTable};

/// Helper to parse a currency code.
/// Panics on invalid input (intended for tests).
pub fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).expect("Invalid test currency code")
}

/// Table with a synthetic `BASE` currency.
pub fn base_table() -> ExchangeRateTable {
    let rows = vec![
        ExchangeRateRow::new("USD", "BASE", 600.0),
        ExchangeRateRow::new("EUR", "BASE", 655.0),
    ];
    ExchangeRateTable::from_rows(code("BASE"), rows).table
}

/// Table mixing base-relative rows and pairwise rows.
pub fn mixed_table() -> ExchangeRateTable {
    let rows = vec![
        ExchangeRateRow::new("USD", "FCFA", 600.0),
        ExchangeRateRow::new("EUR", "FCFA", 655.0),
        ExchangeRateRow::new("CNY", "FCFA", 85.0),
        ExchangeRateRow::new("JPY", "USD", 0.0067),
    ];
    ExchangeRateTable::from_rows(CurrencyCode::fcfa(), rows).table
}
