//! ByProject Sources - Upstream collaborators
//!
//! Everything the caches fetch from lives behind one of two traits:
//!
//! - [`RateSource`]: the bulk exchange rate query (Supabase PostgREST)
//! - [`TranslationProvider`]: text translation (DeepSeek chat completions)
//!
//! Static implementations of both are provided for local runs and tests.

pub mod error;
pub mod rates;
pub mod translate;

pub use error::SourceError;
pub use rates::{RateSource, StaticRateSource, SupabaseConfig, SupabaseRateSource};
pub use translate::{
    DeepSeekTranslator, DisabledTranslator, StaticTranslator, TranslationProvider,
    TranslationRequest,
};
