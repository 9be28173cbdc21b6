//! ByProject Core - Domain types
//!
//! This crate provides the foundational types shared by the rate and
//! translation caches: currency codes, languages, exchange rate tables and
//! the conversion rules applied on top of them.

pub mod conversion;
pub mod error;
pub mod rates;
pub mod types;

pub use conversion::{
    Conversion, ConversionStatus, ConvertedPrice, ConvertedVariation, Price, PriceVariation,
    format_amount, format_conversion,
};
pub use error::{ByprojectError, Result};
pub use rates::{ExchangeRateRow, ExchangeRateTable, PairRate, TableBuild};
pub use types::{CurrencyCode, Language};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
