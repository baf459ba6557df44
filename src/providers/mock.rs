/*!
 * Mock translator implementations for testing.
 *
 * This module provides a deterministic translator that simulates different behaviors:
 * - `MockTranslator::working()` - Always succeeds with a tagged translation
 * - `MockTranslator::failing()` - Always fails with an error
 * - `MockTranslator::failing_for(..)` - Fails only for matching requests
 * - `MockTranslator::slow(..)` - Succeeds after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::translation::Translator;

/// One recorded translator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an error
    Failing,
    /// Fails when the target language matches and, if given, the text matches
    FailingFor {
        target_language: String,
        text: Option<String>,
    },
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Deterministic stand-in for the external translator.
///
/// Clones share the call log, so a clone handed to the pipeline can be
/// inspected afterwards.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<MockRequest>>>,
    responses: Arc<HashMap<(String, String), String>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(HashMap::new()),
        }
    }

    /// Create a working mock translator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock translator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails for one target language, optionally only for one text
    pub fn failing_for(target_language: &str, text: Option<&str>) -> Self {
        Self::new(MockBehavior::FailingFor {
            target_language: target_language.to_string(),
            text: text.map(str::to_string),
        })
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Return fixed translations for (text, target language) pairs
    pub fn with_responses<I>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = ((String, String), String)>,
    {
        self.responses = Arc::new(responses.into_iter().collect());
        self
    }

    /// Number of translate calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// All recorded calls in arrival order
    pub fn calls(&self) -> Vec<MockRequest> {
        self.calls.lock().clone()
    }

    /// Calls received for one target language
    pub fn calls_for(&self, target_language: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.target_language == target_language)
            .count()
    }

    fn render(&self, request: &MockRequest) -> String {
        self.responses
            .get(&(request.text.clone(), request.target_language.clone()))
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", request.target_language, request.text))
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.calls.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Working => Ok(self.render(&request)),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::FailingFor {
                target_language: failing_language,
                text: failing_text,
            } => {
                let language_matches = *failing_language == request.target_language;
                let text_matches = failing_text.as_ref().is_none_or(|t| *t == request.text);
                if language_matches && text_matches {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated failure for '{}'", request.target_language),
                    })
                } else {
                    Ok(self.render(&request))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(self.render(&request))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workingTranslator_shouldTagTargetLanguage() {
        let translator = MockTranslator::working();
        let text = translator.translate("Hello", "en", "fr").await.unwrap();

        assert_eq!(text, "[fr] Hello");
        assert_eq!(translator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failingTranslator_shouldReturnErrorAndRecordCall() {
        let translator = MockTranslator::failing();
        assert!(translator.translate("Hello", "en", "fr").await.is_err());
        assert_eq!(translator.calls()[0].target_language, "fr");
    }

    #[tokio::test]
    async fn test_failingFor_shouldOnlyFailMatchingRequests() {
        let translator = MockTranslator::failing_for("ja", Some("Bye"));

        assert!(translator.translate("Hello", "en", "ja").await.is_ok());
        assert!(translator.translate("Bye", "en", "ja").await.is_err());
        assert!(translator.translate("Bye", "en", "fr").await.is_ok());
        assert_eq!(translator.calls_for("ja"), 2);
    }

    #[tokio::test]
    async fn test_withResponses_shouldReturnFixedTranslation() {
        let translator = MockTranslator::working()
            .with_responses([(("Hello".to_string(), "ja".to_string()), "こんにちは".to_string())]);

        assert_eq!(translator.translate("Hello", "en", "ja").await.unwrap(), "こんにちは");
        assert_eq!(translator.translate("Bye", "en", "ja").await.unwrap(), "[ja] Bye");
    }

    #[tokio::test]
    async fn test_clonedTranslator_shouldShareCallLog() {
        let translator = MockTranslator::working();
        let cloned = translator.clone();

        cloned.translate("Test", "en", "fr").await.unwrap();
        assert_eq!(translator.call_count(), 1);
    }
}
