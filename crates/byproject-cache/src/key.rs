//! Cache key derivation.
//!
//! Keys are pure functions of their inputs: no normalisation, no process
//! state. The same `(source, target, text)` always maps to the same key,
//! across restarts and across server instances sharing a remote store.

use byproject_core::{CurrencyCode, Language};

/// Key of the wholesale exchange rate table.
pub const RATES_KEY: &str = "rates:v1";

/// Namespace of translation entries.
pub const TRANSLATION_PREFIX: &str = "translation";

/// Number of hex characters kept from the content digest (64 bits).
const HASH_HEX_LEN: usize = 16;

/// Returns the truncated BLAKE3 digest of the exact UTF-8 text.
pub fn content_hash(text: &str) -> String {
    let digest = blake3::hash(text.as_bytes());
    digest.to_hex()[..HASH_HEX_LEN].to_string()
}

/// Derives the key of a translation entry.
///
/// ```
/// use byproject_cache::key::translation_key;
/// use byproject_core::Language;
///
/// let key = translation_key("Ciment", Language::Fr, Language::En);
/// assert!(key.starts_with("translation:fr:en:"));
/// assert_eq!(key, translation_key("Ciment", Language::Fr, Language::En));
/// ```
pub fn translation_key(text: &str, source: Language, target: Language) -> String {
    format!(
        "{}:{}:{}:{}",
        TRANSLATION_PREFIX,
        source.code(),
        target.code(),
        content_hash(text)
    )
}

/// Glob matching every translation of a language pair, or all translations.
pub fn translation_pattern(pair: Option<(Language, Language)>) -> String {
    match pair {
        Some((source, target)) => {
            format!("{}:{}:{}:*", TRANSLATION_PREFIX, source.code(), target.code())
        },
        None => format!("{}:*", TRANSLATION_PREFIX),
    }
}

/// Identity of a pairwise lookup derived from the wholesale table.
pub fn pair_key(from: &CurrencyCode, to: &CurrencyCode) -> String {
    format!("rate:{}:{}", from, to)
}
