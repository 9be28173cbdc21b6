//! Error types for ByProject domain operations.
//!
//! This module defines the errors raised while building domain values
//! (currency codes, rate tables, languages). Errors raised by upstream
//! sources and by the cache layer live in their own crates and wrap these
//! where needed.
//!
//! # Example
//!
//! ```
//! use byproject_core::{ByprojectError, CurrencyCode, Result};
//!
//! fn parse_target(code: &str) -> Result<CurrencyCode> {
//!     code.parse()
//! }
//!
//! assert!(parse_target("EUR").is_ok());
//! assert!(parse_target("").unwrap_err().is_validation_error());
//! ```

use thiserror::Error;

/// Main error type for ByProject domain operations.
///
/// Each variant carries enough context to be logged or returned to an
/// API client as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ByprojectError {
    /// The currency code is empty or malformed.
    #[error("Invalid currency code '{code}': {reason}")]
    InvalidCurrency {
        /// The rejected code
        code: String,
        /// Why it was rejected
        reason: String,
    },

    /// A rate is not a positive finite number, or the base is not 1.
    #[error("Invalid rate {rate} for currency '{currency}'")]
    InvalidRate {
        /// Currency the rate was given for
        currency: String,
        /// The rejected rate
        rate: f64,
    },

    /// The language code is not one of the supported languages.
    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// Validation error for an input value.
    #[error("Validation error for field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ByprojectError {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates an InvalidCurrency error.
    pub fn invalid_currency(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCurrency {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidRate error.
    pub fn invalid_rate(currency: impl Into<String>, rate: f64) -> Self {
        Self::InvalidRate {
            currency: currency.into(),
            rate,
        }
    }

    /// Creates an UnsupportedLanguage error.
    pub fn unsupported_language(code: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(code.into())
    }

    /// Creates a ValidationError.
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns true if the error was caused by bad caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCurrency { .. }
                | Self::InvalidRate { .. }
                | Self::UnsupportedLanguage(_)
                | Self::ValidationError { .. }
        )
    }

    /// Returns true if this is a rate error.
    pub fn is_rate_error(&self) -> bool {
        matches!(self, Self::InvalidRate { .. })
    }
}

/// Type alias for Results with ByprojectError.
pub type Result<T> = std::result::Result<T, ByprojectError>;
