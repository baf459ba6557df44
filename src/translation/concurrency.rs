/*!
 * Provider-specific concurrency tuning.
 *
 * This module provides default caps on concurrent translator calls based on
 * provider characteristics such as rate limits and local hardware limits.
 */

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::app_config::TranslationProvider;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Maximum concurrent requests
    pub max_concurrent_requests: usize,
    /// Target requests per minute, if the provider enforces one
    pub target_rpm: Option<u32>,
}

impl ProviderProfile {
    /// Get the default profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::Ollama => Self {
                // Local model, usually a single GPU
                max_concurrent_requests: 4,
                target_rpm: None,
            },
            TranslationProvider::OpenAI => Self {
                max_concurrent_requests: 8,
                target_rpm: Some(60),
            },
            TranslationProvider::Anthropic => Self {
                max_concurrent_requests: 4,
                target_rpm: Some(45),
            },
            TranslationProvider::LMStudio => Self {
                max_concurrent_requests: 2,
                target_rpm: None,
            },
        }
    }

    /// Get effective concurrent requests, respecting any user override
    pub fn effective_concurrent_requests(&self, user_override: Option<usize>) -> usize {
        user_override
            .filter(|n| *n > 0)
            .unwrap_or(self.max_concurrent_requests)
    }
}

/// Shared permit pool bounding in-flight translator calls
pub fn request_limiter(max_concurrent_requests: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(max_concurrent_requests.max(1)))
}
