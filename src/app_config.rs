use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::Path;
use std::time::Duration;

use crate::errors::LocalizeError;
use crate::providers::RetryPolicy;
use crate::translation::concurrency::ProviderProfile;
use crate::translation::merger::FailurePolicy;
use crate::translation::normalizer::{Normalizer, PronunciationRule};
use crate::translation::segmenter::{Segmenter, DEFAULT_MAX_SEGMENT_CHARS};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of beat texts when the document does not name one
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Ordered languages every beat is localized into
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// What to do when some (beat, language) tasks fail
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Re-derive segmented and normalized forms for cached texts
    #[serde(default = "default_true")]
    pub resegment_cached: bool,

    /// Segmenter settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Extra pronunciation rules, applied after the built-in ones
    #[serde(default)]
    pub pronunciation_rules: Vec<PronunciationRuleConfig>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Segmenter settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmentationConfig {
    /// Longest segment, in characters, before recursive splitting kicks in
    #[serde(default = "default_max_segment_chars")]
    pub max_segment_chars: usize,

    /// Languages split recursively; all others stay whole
    #[serde(default = "default_recursive_languages")]
    pub recursive_languages: Vec<String>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_segment_chars: default_max_segment_chars(),
            recursive_languages: default_recursive_languages(),
        }
    }
}

/// One user supplied pronunciation rule
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PronunciationRuleConfig {
    /// Language the rule applies to
    pub lang: String,
    /// Literal text or regular expression to find
    pub from: String,
    /// Replacement text
    pub to: String,
    /// Treat `from` as a regular expression
    #[serde(default)]
    pub pattern: bool,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    Ollama,
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable consulted when no API key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }

    /// Whether requests are rejected without an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (model, endpoint, timeout_secs) = match provider_type {
            TranslationProvider::Ollama => (default_ollama_model(), default_ollama_endpoint(), default_timeout_secs()),
            TranslationProvider::OpenAI => (default_openai_model(), default_openai_endpoint(), default_timeout_secs()),
            TranslationProvider::Anthropic => (
                default_anthropic_model(),
                default_anthropic_endpoint(),
                default_anthropic_timeout_secs(),
            ),
            TranslationProvider::LMStudio => (
                default_lmstudio_model(),
                default_lmstudio_endpoint(),
                default_timeout_secs(),
            ),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on concurrent translator calls; the provider profile decides when unset
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            max_concurrent_requests: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_target_languages() -> Vec<String> {
    vec!["ja".to_string(), "en".to_string()]
}

fn default_max_segment_chars() -> usize {
    DEFAULT_MAX_SEGMENT_CHARS
}

fn default_recursive_languages() -> Vec<String> {
    vec!["ja".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

fn default_system_prompt() -> String {
    crate::translation::prompts::PromptTemplate::LOCALE_TRANSLATOR.to_string()
}

impl Config {
    /// Load a JSON config file, writing the default config there first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), LocalizeError> {
        if self.default_language.trim().is_empty() {
            return Err(LocalizeError::Configuration(
                "Default language must not be empty".to_string(),
            ));
        }

        if self.target_languages.is_empty() {
            return Err(LocalizeError::Configuration(
                "At least one target language is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for language in &self.target_languages {
            if language.trim().is_empty() {
                return Err(LocalizeError::Configuration(
                    "Target languages must not contain empty codes".to_string(),
                ));
            }
            if !seen.insert(language.as_str()) {
                return Err(LocalizeError::Configuration(format!(
                    "Target language '{}' is listed more than once",
                    language
                )));
            }
        }

        if self.segmentation.max_segment_chars == 0 {
            return Err(LocalizeError::Configuration(
                "Maximum segment length must be greater than zero".to_string(),
            ));
        }

        if self.translation.common.max_concurrent_requests == Some(0) {
            return Err(LocalizeError::Configuration(
                "Maximum concurrent requests must be greater than zero".to_string(),
            ));
        }

        // Validate API key for hosted providers
        let provider = self.translation.provider;
        if provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            let hint = provider
                .api_key_env_var()
                .map(|var| format!(" (set it in the config or via {})", var))
                .unwrap_or_default();
            return Err(LocalizeError::Configuration(format!(
                "Translation API key is required for {} provider{}",
                provider.display_name(),
                hint
            )));
        }

        // Surfaces malformed rule patterns before any task starts
        self.build_normalizer()?;

        if !self.target_languages.contains(&self.default_language) {
            warn!(
                "Default language '{}' is not a target language; cached translations cannot be reused",
                self.default_language
            );
        }

        Ok(())
    }

    /// Segmenter configured from `segmentation`
    pub fn build_segmenter(&self) -> Segmenter {
        Segmenter::for_languages(
            self.segmentation.max_segment_chars,
            &self.segmentation.recursive_languages,
        )
    }

    /// Built-in pronunciation rules plus the configured ones
    pub fn build_normalizer(&self) -> Result<Normalizer, LocalizeError> {
        let mut normalizer = Normalizer::with_builtin_rules();
        for rule in &self.pronunciation_rules {
            let compiled = if rule.pattern {
                PronunciationRule::pattern(&rule.from, &rule.to).map_err(|e| {
                    LocalizeError::Configuration(format!(
                        "Invalid pronunciation pattern '{}' for '{}': {}",
                        rule.from, rule.lang, e
                    ))
                })?
            } else {
                PronunciationRule::literal(&rule.from, &rule.to)
            };
            normalizer = normalizer.with_rules(&rule.lang, vec![compiled]);
        }
        Ok(normalizer)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_language: default_language(),
            target_languages: default_target_languages(),
            failure_policy: FailurePolicy::default(),
            resegment_cached: true,
            segmentation: SegmentationConfig::default(),
            pronunciation_rules: Vec::new(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Concurrency cap: explicit setting, else the provider profile
    pub fn optimal_concurrent_requests(&self) -> usize {
        ProviderProfile::for_provider(self.provider)
            .effective_concurrent_requests(self.common.max_concurrent_requests)
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::Anthropic => default_anthropic_model(),
            TranslationProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Override the model of the active provider, adding its entry if missing
    pub fn set_model(&mut self, model: &str) {
        let provider = self.provider;
        let provider_str = provider.to_lowercase_string();
        match self
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(entry) => entry.model = model.to_string(),
            None => {
                let mut entry = ProviderConfig::new(provider);
                entry.model = model.to_string();
                self.available_providers.push(entry);
            }
        }
    }

    /// Get the API key for the active provider, falling back to its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Anthropic => default_anthropic_endpoint(),
            TranslationProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    /// Request timeout for the active provider
    pub fn get_timeout(&self) -> Duration {
        let secs = self
            .get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(|| match self.provider {
                TranslationProvider::Anthropic => default_anthropic_timeout_secs(),
                _ => default_timeout_secs(),
            });
        Duration::from_secs(secs)
    }

    /// Retry settings handed to the provider clients
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.common.retry_count,
            backoff_base_ms: self.common.retry_backoff_ms,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
