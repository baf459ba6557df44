/*!
 * Beat localization pipeline.
 *
 * This module contains everything needed to localize a studio document into
 * several languages. It is split into several submodules:
 *
 * - `document`: Studio document model
 * - `cache`: Cache gate deciding whether a translation can be reused
 * - `segmenter`: Splitting of text into speech-sized chunks
 * - `normalizer`: Pronunciation rewrites for speech synthesis
 * - `core`: The `Translator` capability and the provider-backed service
 * - `prompts`: Prompt templates for the translator
 * - `concurrency`: Caps on concurrent translator calls
 * - `localizer`: One beat into one language
 * - `aggregator`: One beat into every language
 * - `merger`: Whole document, in order, with the failure policy
 */

// Re-export main types for easier usage
pub use self::aggregator::{BeatAggregator, BeatOutcome};
pub use self::cache::{CacheDecision, CacheStats};
pub use self::core::{TranslationService, Translator};
pub use self::localizer::{BeatLocalizer, Localization, TextOrigin};
pub use self::merger::{DocumentMerger, FailurePolicy, LocalizationReport};
pub use self::normalizer::{Normalizer, PronunciationRule};
pub use self::segmenter::{SegmentationPolicy, Segmenter};

// Re-export document model types
pub use self::document::{LocalizedText, MultiLingualTexts, ScriptHeader, StudioBeat, StudioDocument};

// Re-export prompt types
pub use self::prompts::PromptTemplate;

// Submodules
pub mod aggregator;
pub mod cache;
pub mod concurrency;
pub mod core;
pub mod document;
pub mod localizer;
pub mod merger;
pub mod normalizer;
pub mod prompts;
pub mod segmenter;
