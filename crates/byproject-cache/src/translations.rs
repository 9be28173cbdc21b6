//! Translation cache.

use std::sync::Arc;

use byproject_core::Language;
use byproject_sources::{TranslationProvider, TranslationRequest};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::CacheSettings;
use crate::core::{CacheCore, CacheStats};
use crate::health::SourceHealth;
use crate::invalidation::InvalidationResult;
use crate::key::{translation_key, translation_pattern};
use crate::store::CacheStore;

/// How a [`Translation`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TranslationStatus {
    /// Translated by the provider, possibly served from cache.
    Translated,
    /// Returned as is: same language on both sides, or blank text.
    Unchanged,
    /// The provider failed; the text is the original one.
    Failed { reason: String },
    /// No provider is configured; the text is the original one.
    Disabled,
}

const DISABLED_REASON: &str = "translation provider is not configured";

/// Result of a translation lookup. Always carries displayable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
    pub original_text: String,
    pub source: Language,
    pub target: Language,
    pub status: TranslationStatus,
}

impl Translation {
    fn passthrough(request: TranslationRequest, status: TranslationStatus) -> Self {
        Self {
            translated_text: request.text.clone(),
            original_text: request.text,
            source: request.source,
            target: request.target,
            status,
        }
    }

    /// Returns true unless the provider failed or is disabled.
    pub fn is_translated(&self) -> bool {
        matches!(
            self.status,
            TranslationStatus::Translated | TranslationStatus::Unchanged
        )
    }

    /// Returns why the original text was kept, if no translation happened.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            TranslationStatus::Failed { reason } => Some(reason),
            TranslationStatus::Disabled => Some(DISABLED_REASON),
            _ => None,
        }
    }
}

/// Per-text translation cache.
///
/// Entries are keyed by language pair and content hash. There is no
/// fallback value: a failed translation is returned as a
/// [`TranslationStatus::Failed`] marker carrying the original text, and
/// is not cached. A disabled provider is never called and leaves the
/// source health untouched.
#[derive(Clone)]
pub struct TranslationCache {
    core: CacheCore<String>,
    provider: Arc<dyn TranslationProvider>,
}

impl TranslationCache {
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        settings: CacheSettings,
        remote: Option<Arc<dyn CacheStore<String>>>,
    ) -> Self {
        let core = CacheCore::builder("translations")
            .settings(settings)
            .remote_opt(remote)
            .build();

        Self { core, provider }
    }

    /// Translates a text through the cache.
    pub async fn translate(&self, request: TranslationRequest) -> Translation {
        if request.source == request.target || request.text.trim().is_empty() {
            return Translation::passthrough(request, TranslationStatus::Unchanged);
        }

        if !self.provider.is_enabled() {
            debug!(provider = self.provider.name(), "Translation provider disabled");
            return Translation::passthrough(request, TranslationStatus::Disabled);
        }

        let key = translation_key(&request.text, request.source, request.target);
        let provider = Arc::clone(&self.provider);
        let upstream = request.clone();
        let ttl = self.core.settings().ttl;

        let result = self
            .core
            .get(
                &key,
                move || async move { provider.translate(&upstream).await },
                ttl,
            )
            .await;

        match result {
            Ok(translated) => Translation {
                translated_text: translated,
                original_text: request.text,
                source: request.source,
                target: request.target,
                status: TranslationStatus::Translated,
            },
            Err(e) => {
                warn!(
                    source = %request.source,
                    target = %request.target,
                    key = %key,
                    error = %e,
                    "Translation failed, returning original text"
                );
                let reason = e.reason().to_string();
                Translation::passthrough(request, TranslationStatus::Failed { reason })
            },
        }
    }

    /// Translates several texts concurrently, keeping their order.
    ///
    /// Each text goes through the cache on its own, so duplicates in the
    /// batch share one provider call.
    pub async fn translate_batch(&self, requests: Vec<TranslationRequest>) -> Vec<Translation> {
        join_all(requests.into_iter().map(|request| self.translate(request))).await
    }

    /// Returns true if a live translation is cached locally.
    pub async fn is_cached(&self, text: &str, source: Language, target: Language) -> bool {
        self.core
            .is_live(&translation_key(text, source, target))
            .await
    }

    /// Drops the cached translation of one text.
    pub async fn invalidate(&self, text: &str, source: Language, target: Language) {
        self.core
            .invalidate(&translation_key(text, source, target))
            .await;
    }

    /// Drops every cached translation for a language pair.
    pub async fn invalidate_pair(&self, source: Language, target: Language) -> InvalidationResult {
        self.core
            .invalidate_by_pattern(&translation_pattern(Some((source, target))))
            .await
    }

    /// Drops every cached translation.
    pub async fn invalidate_all(&self) -> InvalidationResult {
        self.core
            .invalidate_by_pattern(&translation_pattern(None))
            .await
    }

    pub fn health(&self) -> &SourceHealth {
        self.core.health()
    }

    pub fn stats(&self) -> CacheStats {
        self.core.stats()
    }

    pub fn core(&self) -> &CacheCore<String> {
        &self.core
    }
}
