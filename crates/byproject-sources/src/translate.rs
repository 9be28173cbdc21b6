//! Translation providers.
//!
//! The production provider calls the DeepSeek chat completions API with a
//! fixed construction-materials prompt. Providers are plain request/response:
//! caching, coalescing and failure markers live one layer up.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use byproject_core::Language;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SourceError;

/// Default DeepSeek endpoint.
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

const MODEL: &str = "deepseek-chat";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 2000;

/// A single translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
    /// Optional hint about where the text comes from (e.g. "material name").
    pub context: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: Language, target: Language) -> Self {
        Self {
            text: text.into(),
            source,
            target,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Trait for translation backends.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translates a text, returning only the translated string.
    async fn translate(&self, request: &TranslationRequest) -> Result<String, SourceError>;

    /// Returns a short name for logging.
    fn name(&self) -> &str;

    /// Returns false when the provider is switched off by configuration.
    /// Callers skip disabled providers instead of recording failures.
    fn is_enabled(&self) -> bool {
        true
    }
}

fn system_prompt(request: &TranslationRequest) -> String {
    let mut prompt = format!(
        "You are a professional translator specializing in construction and building materials. \
         Translate the following text from {} to {}. \
         Maintain technical accuracy and use appropriate construction terminology. \
         Return only the translated text.",
        request.source.name(),
        request.target.name()
    );
    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(" Context: ");
        prompt.push_str(context);
    }
    prompt
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// DeepSeek chat completions client.
pub struct DeepSeekTranslator {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl DeepSeekTranslator {
    /// Creates a client for the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SourceError> {
        Self::with_base_url(api_key, DEEPSEEK_BASE_URL)
    }

    /// Creates a client for a custom endpoint.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SourceError::invalid_config("deepseek api key is empty"));
        }

        let timeout = Duration::from_secs(30);
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::invalid_config(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            max_retries: 2,
        })
    }

    /// Sets how many times transient failures are retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<String, SourceError> {
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(e, self.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::from_status(status, body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SourceError::invalid_response(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| SourceError::invalid_response("empty completion"))
    }
}

#[async_trait]
impl TranslationProvider for DeepSeekTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, SourceError> {
        let prompt = system_prompt(request);
        let body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.text,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(text) => {
                    debug!(
                        source = %request.source,
                        target = %request.target,
                        attempt,
                        "Translation completed"
                    );
                    return Ok(text);
                },
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let backoff = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(error = %e, attempt, ?backoff, "Transient translation failure, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "deepseek"
    }
}

/// A provider serving translations from a fixed dictionary.
///
/// Texts without an entry fail with [`SourceError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct StaticTranslator {
    entries: HashMap<(Language, Language, String), String>,
}

impl StaticTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn with(
        mut self,
        source: Language,
        target: Language,
        text: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        self.entries
            .insert((source, target, text.into()), translated.into());
        self
    }
}

#[async_trait]
impl TranslationProvider for StaticTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, SourceError> {
        self.entries
            .get(&(request.source, request.target, request.text.clone()))
            .cloned()
            .ok_or_else(|| SourceError::unavailable("no static translation for text"))
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Provider used when no API key is configured. Every call fails and
/// [`TranslationProvider::is_enabled`] returns false.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranslator;

#[async_trait]
impl TranslationProvider for DisabledTranslator {
    async fn translate(&self, _request: &TranslationRequest) -> Result<String, SourceError> {
        Err(SourceError::invalid_config("translation provider is not configured"))
    }

    fn name(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_languages() {
        let request = TranslationRequest::new("Ciment", Language::Fr, Language::Zh);
        let prompt = system_prompt(&request);

        assert!(prompt.contains("from French to Simplified Chinese"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn test_system_prompt_includes_context() {
        let request =
            TranslationRequest::new("Ciment", Language::Fr, Language::En).with_context("material name");
        assert!(system_prompt(&request).ends_with("Context: material name"));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(DeepSeekTranslator::new("   ").is_err());
    }

    #[tokio::test]
    async fn test_static_translator() {
        let provider = StaticTranslator::new().with(Language::Fr, Language::En, "Brique", "Brick");

        let hit = provider
            .translate(&TranslationRequest::new("Brique", Language::Fr, Language::En))
            .await
            .unwrap();
        assert_eq!(hit, "Brick");

        let miss = provider
            .translate(&TranslationRequest::new("Brique", Language::Fr, Language::Zh))
            .await;
        assert!(miss.is_err());
    }

    #[tokio::test]
    async fn test_disabled_translator_always_fails() {
        let result = DisabledTranslator
            .translate(&TranslationRequest::new("Sable", Language::Fr, Language::En))
            .await;
        assert!(matches!(result, Err(SourceError::InvalidConfig(_))));
        assert!(!DisabledTranslator.is_enabled());
        assert!(StaticTranslator::new().is_enabled());
    }
}
