/*!
 * Core translation service implementation.
 *
 * This module defines the `Translator` capability the localization pipeline
 * depends on, and `TranslationService`, which implements it on top of the
 * configured LLM provider.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use super::prompts::{build_user_prompt, PromptTemplate};
use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;

/// External translation capability.
///
/// One call translates one text; failures are reported, never retried here.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_language` into `target_language`
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        (**self).translate(text, source_language, target_language).await
    }
}

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Number of translator requests
    pub requests: u64,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl TokenUsageStats {
    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            requests: 0,
            api_duration: Duration::ZERO,
            provider,
            model,
        }
    }

    /// Record one request
    pub fn add_request(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        self.prompt_tokens += prompt_tokens.unwrap_or(0);
        self.completion_tokens += completion_tokens.unwrap_or(0);
        self.requests += 1;
        self.api_duration += duration;
    }

    /// Prompt plus completion tokens
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} requests, {} prompt + {} completion tokens, {:.1}s API time",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.api_duration.as_secs_f64()
        )
    }
}

/// Validate an endpoint and return it as a base URL without trailing slash
fn parse_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama { client: Ollama },

    /// OpenAI API service
    OpenAI { client: OpenAI },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio { client: OpenAI },

    /// Anthropic API service
    Anthropic { client: Anthropic },
}

/// `Translator` backed by one of the configured LLM providers
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// System prompt template
    template: PromptTemplate,

    /// Token usage over the lifetime of the service
    usage: Mutex<TokenUsageStats>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let timeout = config.get_timeout();
        let retry = config.retry_policy();
        let endpoint = parse_endpoint(&config.get_endpoint())?;

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::new(endpoint, timeout, retry),
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), endpoint, timeout, retry),
            },
            ConfigTranslationProvider::LMStudio => TranslationProviderImpl::LMStudio {
                // LM Studio often doesn't require an API key; use a default if empty
                client: OpenAI::new(
                    {
                        let k = config.get_api_key();
                        if k.is_empty() { "lm-studio".to_string() } else { k }
                    },
                    endpoint,
                    timeout,
                    retry,
                ),
            },
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), endpoint, timeout, retry),
            },
        };

        let usage = TokenUsageStats::with_provider_info(
            config.provider.display_name().to_string(),
            config.get_model(),
        );

        Ok(Self {
            provider,
            template: PromptTemplate::new(&config.common.system_prompt),
            config,
            usage: Mutex::new(usage),
        })
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        let result = match &self.provider {
            TranslationProviderImpl::Ollama { client } => client.test_connection().await,
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                client.test_connection().await
            }
            TranslationProviderImpl::Anthropic { client } => client.test_connection().await,
        };

        if let Err(e) = &result {
            error!("Failed to connect to {}: {}", self.config.provider.display_name(), e);
        }
        result
    }

    /// Snapshot of token usage so far
    pub fn usage(&self) -> TokenUsageStats {
        self.usage.lock().clone()
    }

    async fn request(
        &self,
        system_prompt: &str,
        user_prompt: String,
    ) -> Result<(String, Option<u64>, Option<u64>), ProviderError> {
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(model, user_prompt)
                    .system(system_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok((
                    Ollama::extract_text(&response),
                    response.prompt_eval_count,
                    response.eval_count,
                ))
            }
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let request = OpenAIRequest::new(&model)
                    .add_message("system", system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature)
                    .max_tokens(max_tokens_for_model(&model));
                let response = client.complete(request).await?;
                let usage = response.usage.as_ref();
                Ok((
                    OpenAI::extract_text(&response),
                    usage.map(|u| u64::from(u.prompt_tokens)),
                    usage.map(|u| u64::from(u.completion_tokens)),
                ))
            }
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(&model, max_tokens_for_model(&model))
                    .system(system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok((
                    Anthropic::extract_text(&response),
                    Some(u64::from(response.usage.input_tokens)),
                    Some(u64::from(response.usage.output_tokens)),
                ))
            }
        }
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let start_time = Instant::now();
        let system_prompt = self.template.render(source_language, target_language);
        let user_prompt = build_user_prompt(text, source_language, target_language);

        let result = self.request(&system_prompt, user_prompt).await;
        let duration = start_time.elapsed();

        match result {
            Ok((translated, prompt_tokens, completion_tokens)) => {
                self.usage.lock().add_request(prompt_tokens, completion_tokens, duration);
                debug!(
                    "{} translated {} chars ({} -> {}) in {:?}",
                    self.config.provider.display_name(),
                    text.chars().count(),
                    source_language,
                    target_language,
                    duration
                );
                if translated.is_empty() && !text.trim().is_empty() {
                    return Err(ProviderError::ParseError(format!(
                        "{} returned an empty translation",
                        self.config.provider.display_name()
                    )));
                }
                Ok(translated)
            }
            Err(e) => {
                error!(
                    "{} translation error ({} -> {}): {}",
                    self.config.provider.display_name(),
                    source_language,
                    target_language,
                    e
                );
                Err(e)
            }
        }
    }
}

/// Get the maximum number of tokens for a given model
fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        "gpt-4" | "gpt-4-0613" => 8192,
        "gpt-4o" | "gpt-4o-mini" | "gpt-4-turbo" => 4096,
        "gpt-3.5-turbo" => 4096,
        m if m.starts_with("claude-") => 4096,
        // Default for unknown models
        _ => 2048,
    }
}
