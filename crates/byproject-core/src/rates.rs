//! Exchange rate tables.
//!
//! A table is fetched wholesale from the rate source and holds one multiplier
//! per currency, all relative to a single base currency: a rate of `655` for
//! `EUR` means 1 EUR equals 655 units of the base. Rows that are not
//! expressed against the base are kept as pairwise rates and only consulted
//! when the base-relative lookup cannot answer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ByprojectError, Result};
use crate::types::CurrencyCode;

/// A row as returned by the rate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateRow {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ExchangeRateRow {
    /// Creates a row without an update timestamp.
    pub fn new(from: impl Into<String>, to: impl Into<String>, rate: f64) -> Self {
        Self {
            from_currency: from.into(),
            to_currency: to.into(),
            rate,
            updated_at: None,
        }
    }
}

/// A direct rate between two non-base currencies: `1 from = rate to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRate {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
}

/// Result of building a table from source rows.
#[derive(Debug, Clone)]
pub struct TableBuild {
    /// The table built from every valid row.
    pub table: ExchangeRateTable,
    /// Rows that were skipped, with the reason.
    pub rejected: Vec<ByprojectError>,
}

/// Base-relative exchange rates.
///
/// Invariant: `rate(base) == Some(1.0)` and every stored rate is positive
/// and finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateTable {
    base: CurrencyCode,
    rates: IndexMap<CurrencyCode, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pairs: Vec<PairRate>,
}

/// Approximate rates used when the rate source is unreachable.
const FALLBACK_RATES: &[(&str, f64)] = &[
    ("CNY", 85.0),
    ("USD", 600.0),
    ("EUR", 655.0),
    ("GBP", 765.0),
    ("TRY", 20.0),
    ("AED", 163.0),
];

fn check_rate(currency: &CurrencyCode, rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ByprojectError::invalid_rate(currency.as_str(), rate))
    }
}

impl ExchangeRateTable {
    /// Creates a table containing only the base currency.
    pub fn new(base: CurrencyCode) -> Self {
        let mut rates = IndexMap::new();
        rates.insert(base.clone(), 1.0);
        Self {
            base,
            rates,
            pairs: Vec::new(),
        }
    }

    /// Static default table (base `FCFA`), used as the fallback value.
    ///
    /// Values are approximate.
    pub fn fallback() -> Self {
        let mut table = Self::new(CurrencyCode::fcfa());
        for (code, rate) in FALLBACK_RATES {
            table
                .rates
                .insert(CurrencyCode(code.to_string()), *rate);
        }
        table
    }

    /// Static default table expressed against `base`, when the default
    /// table lists that currency.
    pub fn fallback_for(base: &CurrencyCode) -> Option<Self> {
        Self::fallback().rebased(base)
    }

    /// Returns the same rates expressed against another base.
    ///
    /// Every base-relative rate is divided by the new base's rate, so cross
    /// rates are unchanged. Returns `None` when `base` has no base-relative
    /// rate in this table. Pairwise rates are kept as they are.
    pub fn rebased(&self, base: &CurrencyCode) -> Option<Self> {
        let pivot = self.rate(base)?;
        let rates = self
            .rates
            .iter()
            .map(|(code, rate)| {
                let rate = if code == base { 1.0 } else { rate / pivot };
                (code.clone(), rate)
            })
            .collect();

        Some(Self {
            base: base.clone(),
            rates,
            pairs: self.pairs.clone(),
        })
    }

    /// Builds a table from source rows.
    ///
    /// Rows targeting the base become base-relative rates; other rows become
    /// pairwise rates. When a currency appears twice the first row wins, so
    /// callers should pass rows newest first. Invalid rows are skipped and
    /// reported in [`TableBuild::rejected`].
    pub fn from_rows(base: CurrencyCode, rows: impl IntoIterator<Item = ExchangeRateRow>) -> TableBuild {
        let mut table = Self::new(base);
        let mut rejected = Vec::new();

        for row in rows {
            let parsed = CurrencyCode::parse(&row.from_currency)
                .and_then(|from| CurrencyCode::parse(&row.to_currency).map(|to| (from, to)));

            let (from, to) = match parsed {
                Ok(pair) => pair,
                Err(e) => {
                    rejected.push(e);
                    continue;
                },
            };

            let outcome = if to == table.base {
                if table.rates.contains_key(&from) && from != table.base {
                    continue;
                }
                table.insert(from, row.rate)
            } else if table.pair_rate(&from, &to).is_some() {
                continue;
            } else {
                table.insert_pair(from, to, row.rate)
            };

            if let Err(e) = outcome {
                rejected.push(e);
            }
        }

        TableBuild { table, rejected }
    }

    /// Inserts or replaces a base-relative rate.
    ///
    /// The base itself can only be set to exactly `1`.
    pub fn insert(&mut self, currency: CurrencyCode, rate: f64) -> Result<()> {
        check_rate(&currency, rate)?;
        if currency == self.base && rate != 1.0 {
            return Err(ByprojectError::invalid_rate(currency.as_str(), rate));
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Inserts or replaces a direct pairwise rate.
    pub fn insert_pair(&mut self, from: CurrencyCode, to: CurrencyCode, rate: f64) -> Result<()> {
        check_rate(&from, rate)?;
        if from == to {
            return Err(ByprojectError::validation_error(
                "to_currency",
                "pairwise rate must involve two distinct currencies",
            ));
        }
        match self.pairs.iter_mut().find(|p| p.from == from && p.to == to) {
            Some(existing) => existing.rate = rate,
            None => self.pairs.push(PairRate { from, to, rate }),
        }
        Ok(())
    }

    /// Returns the base currency.
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Returns the base-relative rate for a currency.
    pub fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    /// Returns the direct pairwise rate `from -> to`, if one was loaded.
    pub fn pair_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        self.pairs
            .iter()
            .find(|p| &p.from == from && &p.to == to)
            .map(|p| p.rate)
    }

    /// Returns the base-relative rates in insertion order.
    pub fn rates(&self) -> &IndexMap<CurrencyCode, f64> {
        &self.rates
    }

    /// Returns the pairwise rates.
    pub fn pairs(&self) -> &[PairRate] {
        &self.pairs
    }

    /// Returns true if the currency has a base-relative rate.
    pub fn contains(&self, currency: &CurrencyCode) -> bool {
        self.rates.contains_key(currency)
    }

    /// Number of base-relative rates, base included.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if only the base is known.
    pub fn is_empty(&self) -> bool {
        self.rates.len() <= 1 && self.pairs.is_empty()
    }

    /// Returns the base-relative rate, deriving it through one pairwise hop
    /// when the currency is only quoted against another non-base currency.
    pub fn effective_rate(&self, currency: &CurrencyCode) -> Option<f64> {
        if let Some(rate) = self.rate(currency) {
            return Some(rate);
        }
        self.pairs.iter().find_map(|p| {
            if &p.from == currency {
                self.rate(&p.to).map(|r| p.rate * r)
            } else if &p.to == currency {
                self.rate(&p.from).map(|r| r / p.rate)
            } else {
                None
            }
        })
    }

    /// Returns the multiplier that converts one unit of `from` into `to`.
    ///
    /// Tries the base-relative rates first, then a direct pair, then the
    /// inverse of the opposite pair.
    pub fn cross_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        if let (Some(from_rate), Some(to_rate)) = (self.effective_rate(from), self.effective_rate(to))
        {
            return Some(from_rate / to_rate);
        }
        if let Some(direct) = self.pair_rate(from, to) {
            return Some(direct);
        }
        self.pair_rate(to, from).map(|inverse| 1.0 / inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_new_table_contains_base() {
        let table = ExchangeRateTable::new(code("BASE"));
        assert_eq!(table.rate(&code("BASE")), Some(1.0));
        assert!(table.is_empty());
    }

    #[test]
    fn test_fallback_table() {
        let table = ExchangeRateTable::fallback();

        assert_eq!(table.base(), &CurrencyCode::fcfa());
        assert_eq!(table.rate(&CurrencyCode::fcfa()), Some(1.0));
        assert_eq!(table.rate(&code("EUR")), Some(655.0));
        assert_eq!(table.rate(&code("CNY")), Some(85.0));
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn test_rebased_keeps_cross_rates() {
        let table = ExchangeRateTable::fallback();
        let eur = table.rebased(&code("EUR")).unwrap();

        assert_eq!(eur.base(), &code("EUR"));
        assert_eq!(eur.rate(&code("EUR")), Some(1.0));
        assert!((eur.rate(&CurrencyCode::fcfa()).unwrap() - 1.0 / 655.0).abs() < 1e-12);
        assert_eq!(eur.len(), table.len());

        for (from, _) in table.rates() {
            for (to, _) in table.rates() {
                let before = table.cross_rate(from, to).unwrap();
                let after = eur.cross_rate(from, to).unwrap();
                assert!((before - after).abs() < 1e-9 * before, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_rebased_unknown_base() {
        assert!(ExchangeRateTable::fallback().rebased(&code("XAF")).is_none());
        assert!(ExchangeRateTable::fallback_for(&code("XAF")).is_none());
        assert_eq!(
            ExchangeRateTable::fallback_for(&CurrencyCode::fcfa()),
            Some(ExchangeRateTable::fallback())
        );
    }

    #[test]
    fn test_insert_rejects_invalid_rates() {
        let mut table = ExchangeRateTable::new(code("BASE"));

        assert!(table.insert(code("USD"), 0.0).is_err());
        assert!(table.insert(code("USD"), -1.0).is_err());
        assert!(table.insert(code("USD"), f64::NAN).is_err());
        assert!(table.insert(code("USD"), f64::INFINITY).is_err());
        assert!(table.insert(code("BASE"), 2.0).is_err());
        assert!(table.insert(code("BASE"), 1.0).is_ok());
    }

    #[test]
    fn test_from_rows_splits_base_and_pairs() {
        let rows = vec![
            ExchangeRateRow::new("USD", "FCFA", 600.0),
            ExchangeRateRow::new("EUR", "FCFA", 655.0),
            ExchangeRateRow::new("CNY", "USD", 0.14),
        ];

        let build = ExchangeRateTable::from_rows(CurrencyCode::fcfa(), rows);

        assert!(build.rejected.is_empty());
        assert_eq!(build.table.rate(&code("USD")), Some(600.0));
        assert_eq!(build.table.pair_rate(&code("CNY"), &code("USD")), Some(0.14));
        assert!(!build.table.contains(&code("CNY")));
    }

    #[test]
    fn test_from_rows_first_row_wins() {
        let rows = vec![
            ExchangeRateRow::new("USD", "FCFA", 610.0),
            ExchangeRateRow::new("USD", "FCFA", 590.0),
        ];

        let build = ExchangeRateTable::from_rows(CurrencyCode::fcfa(), rows);
        assert_eq!(build.table.rate(&code("USD")), Some(610.0));
    }

    #[test]
    fn test_from_rows_reports_rejected_rows() {
        let rows = vec![
            ExchangeRateRow::new("USD", "FCFA", -600.0),
            ExchangeRateRow::new("??", "FCFA", 1.0),
            ExchangeRateRow::new("EUR", "FCFA", 655.0),
        ];

        let build = ExchangeRateTable::from_rows(CurrencyCode::fcfa(), rows);

        assert_eq!(build.rejected.len(), 2);
        assert_eq!(build.table.len(), 2);
    }

    #[test]
    fn test_cross_rate_uses_inverse_pair() {
        let mut table = ExchangeRateTable::new(CurrencyCode::fcfa());
        table.insert_pair(code("CNY"), code("USD"), 0.125).unwrap();

        assert_eq!(table.cross_rate(&code("USD"), &code("CNY")), Some(8.0));
        assert_eq!(table.cross_rate(&code("CNY"), &code("USD")), Some(0.125));
        assert_eq!(table.cross_rate(&code("GBP"), &code("USD")), None);
    }

    #[test]
    fn test_table_serializes_with_string_keys() {
        let table = ExchangeRateTable::fallback();
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json["base"], "FCFA");
        assert_eq!(json["rates"]["USD"], 600.0);

        let back: ExchangeRateTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
