//! Common newtypes shared by the rate and translation caches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ByprojectError, Result};

/// Currency identifier.
///
/// Codes are trimmed and upper-cased on construction so that `"usd"` and
/// `" USD "` refer to the same currency. Three or four ASCII letters are
/// accepted, which covers ISO codes as well as the local `FCFA` label.
///
/// # Example
///
/// ```
/// use byproject_core::CurrencyCode;
///
/// let code: CurrencyCode = "eur".parse().unwrap();
/// assert_eq!(code.as_str(), "EUR");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(pub(crate) String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = code.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(ByprojectError::invalid_currency(code, "cannot be empty"));
        }
        if !(3..=4).contains(&normalized.len()) {
            return Err(ByprojectError::invalid_currency(
                code,
                "must be 3 or 4 letters long",
            ));
        }
        if !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ByprojectError::invalid_currency(
                code,
                "must only contain ASCII letters",
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the default base currency (`FCFA`).
    pub fn fcfa() -> Self {
        Self("FCFA".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ByprojectError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ByprojectError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = ByprojectError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Languages supported by the translation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French, the language materials are authored in.
    #[default]
    Fr,
    /// English.
    En,
    /// Simplified Chinese, used for suppliers in China.
    Zh,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 3] = [Language::Fr, Language::En, Language::Zh];

    /// Returns the two-letter code used in cache keys and APIs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    /// Returns the English name handed to the translation provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fr => "French",
            Self::En => "English",
            Self::Zh => "Simplified Chinese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ByprojectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Self::Fr),
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            _ => Err(ByprojectError::unsupported_language(s)),
        }
    }
}
