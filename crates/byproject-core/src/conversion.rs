//! Currency conversion over an [`ExchangeRateTable`].
//!
//! Conversion never fails: when no rate connects the two currencies the
//! original amount is returned in its original currency, flagged as
//! [`ConversionStatus::Unconverted`] so the caller can display it with an
//! indicator instead of a wrong number.

use serde::{Deserialize, Serialize};

use crate::rates::ExchangeRateTable;
use crate::types::CurrencyCode;

/// An amount paired with the currency it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub amount: f64,
    pub currency: CurrencyCode,
    pub status: ConversionStatus,
}

/// How a [`Conversion`] was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConversionStatus {
    /// Source and target were the same currency; no lookup was made.
    Unchanged,
    /// Converted with the given cross rate.
    Converted { rate: f64 },
    /// No rate was available; amount and currency are the original ones.
    Unconverted { reason: String },
}

impl Conversion {
    /// An amount returned as is, without any table lookup.
    pub fn unchanged(amount: f64, currency: CurrencyCode) -> Self {
        Self {
            amount,
            currency,
            status: ConversionStatus::Unchanged,
        }
    }

    /// Returns true if the amount is expressed in the requested currency.
    pub fn is_converted(&self) -> bool {
        !matches!(self.status, ConversionStatus::Unconverted { .. })
    }

    /// Returns the warning attached to an unconverted amount.
    pub fn warning(&self) -> Option<&str> {
        match &self.status {
            ConversionStatus::Unconverted { reason } => Some(reason),
            _ => None,
        }
    }
}

impl ExchangeRateTable {
    /// Converts `amount` from one currency to another.
    ///
    /// # Example
    ///
    /// ```
    /// use byproject_core::{CurrencyCode, ExchangeRateTable};
    ///
    /// let table = ExchangeRateTable::fallback();
    /// let usd: CurrencyCode = "USD".parse().unwrap();
    /// let eur: CurrencyCode = "EUR".parse().unwrap();
    ///
    /// let result = table.convert(10.0, &usd, &eur);
    /// assert!((result.amount - 10.0 * 600.0 / 655.0).abs() < 1e-9);
    /// ```
    pub fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> Conversion {
        if from == to {
            return Conversion::unchanged(amount, to.clone());
        }

        match self.cross_rate(from, to) {
            Some(rate) => Conversion {
                amount: amount * rate,
                currency: to.clone(),
                status: ConversionStatus::Converted { rate },
            },
            None => Conversion {
                amount,
                currency: from.clone(),
                status: ConversionStatus::Unconverted {
                    reason: format!("no exchange rate from {} to {}", from, to),
                },
            },
        }
    }

    /// Converts a price and all of its variations into `target`.
    pub fn convert_price(&self, price: &Price, target: &CurrencyCode) -> ConvertedPrice {
        let main = self.convert(price.amount, &price.currency, target);

        let variations = price
            .variations
            .iter()
            .map(|v| ConvertedVariation {
                label: v.label.clone(),
                original_amount: v.amount,
                converted_amount: self.convert(v.amount, &price.currency, target).amount,
            })
            .collect();

        ConvertedPrice {
            original_amount: price.amount,
            original_currency: price.currency.clone(),
            converted_amount: main.amount,
            display_currency: main.currency.clone(),
            status: main.status,
            variations,
        }
    }
}

/// A supplier price, optionally with quantity/packaging variations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: CurrencyCode,
    #[serde(default)]
    pub variations: Vec<PriceVariation>,
}

/// One variation of a [`Price`], in the same currency as the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVariation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub amount: f64,
}

/// A price with original and converted amounts side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedPrice {
    pub original_amount: f64,
    pub original_currency: CurrencyCode,
    pub converted_amount: f64,
    pub display_currency: CurrencyCode,
    pub status: ConversionStatus,
    pub variations: Vec<ConvertedVariation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedVariation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub original_amount: f64,
    pub converted_amount: f64,
}

/// Formats an amount with no decimals and a space as thousands separator.
///
/// ```
/// use byproject_core::{CurrencyCode, format_amount};
///
/// assert_eq!(format_amount(6550.4, &CurrencyCode::fcfa()), "6 550 FCFA");
/// ```
pub fn format_amount(amount: f64, currency: &CurrencyCode) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{} {}", grouped, currency)
    } else {
        format!("{} {}", grouped, currency)
    }
}

/// Formats a conversion, optionally followed by the original amount.
///
/// The original is only shown when the conversion changed the currency.
pub fn format_conversion(
    conversion: &Conversion,
    original: Option<(f64, &CurrencyCode)>,
) -> String {
    let formatted = format_amount(conversion.amount, &conversion.currency);

    match original {
        Some((amount, currency)) if currency != &conversion.currency => {
            format!("{} ({} {})", formatted, amount, currency)
        },
        _ => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_same_currency_is_unchanged() {
        let table = ExchangeRateTable::new(code("BASE"));
        let result = table.convert(10.0, &code("EUR"), &code("EUR"));

        assert_eq!(result.amount, 10.0);
        assert_eq!(result.currency, code("EUR"));
        assert_eq!(result.status, ConversionStatus::Unchanged);
    }

    #[test]
    fn test_missing_rate_is_unconverted() {
        let table = ExchangeRateTable::fallback();
        let result = table.convert(42.0, &code("JPY"), &code("EUR"));

        assert_eq!(result.amount, 42.0);
        assert_eq!(result.currency, code("JPY"));
        assert!(!result.is_converted());
        assert!(result.warning().unwrap().contains("JPY"));
    }

    #[test]
    fn test_format_amount_grouping() {
        assert_eq!(format_amount(0.0, &code("EUR")), "0 EUR");
        assert_eq!(format_amount(999.0, &code("EUR")), "999 EUR");
        assert_eq!(format_amount(1000.0, &code("EUR")), "1 000 EUR");
        assert_eq!(format_amount(1234567.6, &code("EUR")), "1 234 568 EUR");
        assert_eq!(format_amount(-1500.0, &code("EUR")), "-1 500 EUR");
    }

    #[test]
    fn test_format_conversion_shows_original() {
        let table = ExchangeRateTable::fallback();
        let result = table.convert(10.0, &code("EUR"), &CurrencyCode::fcfa());

        assert_eq!(
            format_conversion(&result, Some((10.0, &code("EUR")))),
            "6 550 FCFA (10 EUR)"
        );
        assert_eq!(format_conversion(&result, None), "6 550 FCFA");
    }

    #[test]
    fn test_convert_price_with_variations() {
        let table = ExchangeRateTable::fallback();
        let price = Price {
            amount: 2.0,
            currency: code("USD"),
            variations: vec![PriceVariation {
                label: Some("carton".to_string()),
                amount: 10.0,
            }],
        };

        let converted = table.convert_price(&price, &CurrencyCode::fcfa());

        assert_eq!(converted.converted_amount, 1200.0);
        assert_eq!(converted.display_currency, CurrencyCode::fcfa());
        assert_eq!(converted.variations[0].converted_amount, 6000.0);
        assert_eq!(converted.variations[0].original_amount, 10.0);
    }
}
