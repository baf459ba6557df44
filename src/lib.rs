/*!
 * # Studio Localizer
 *
 * A Rust library for localizing studio documents (ordered narration beats)
 * into several languages, producing speech-ready text for each beat.
 *
 * ## Features
 *
 * - Translate beats using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API and LM Studio
 *   - Anthropic API
 * - Reuse translations of unchanged beats across runs
 * - Split Japanese (and other configured languages) into speech-sized segments
 * - Rewrite segments into their spoken form for text-to-speech
 * - Concurrent beats and languages with a cap on translator calls
 * - Deterministic, order-preserving merge with a configurable failure policy
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The localization pipeline:
 *   - `translation::cache`: Cache gate
 *   - `translation::segmenter`: Speech segmentation
 *   - `translation::normalizer`: Pronunciation normalization
 *   - `translation::localizer`: One beat into one language
 *   - `translation::aggregator`: One beat into every language
 *   - `translation::merger`: Whole document
 *   - `translation::core`: `Translator` trait and provider-backed service
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Deterministic translator for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, BeatFailure, LanguageFailure, LocalizeError, ProviderError};
pub use language_utils::{get_language_name, language_label};
pub use translation::{
    DocumentMerger, FailurePolicy, LocalizationReport, LocalizedText, StudioBeat, StudioDocument,
    TranslationService, Translator,
};
