/*!
 * Beat localizer.
 *
 * Produces one `LocalizedText` for one (beat, target language) pair:
 * cache gate, then the external translator if needed, then segmentation
 * and pronunciation normalization.
 */

use std::sync::Arc;
use tokio::sync::Semaphore;

use super::cache::{self, CacheDecision, CacheStats};
use super::concurrency::request_limiter;
use super::core::Translator;
use super::document::{LocalizedText, StudioBeat};
use super::normalizer::Normalizer;
use super::segmenter::Segmenter;
use crate::errors::LocalizeError;

/// Where the text of a `LocalizedText` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOrigin {
    /// Reused from a prior run
    Cached,
    /// Source language, copied from the beat
    Identity,
    /// Returned by the external translator
    Translated,
}

/// Result of localizing one beat into one language
#[derive(Debug, Clone, PartialEq)]
pub struct Localization {
    pub text: LocalizedText,
    pub origin: TextOrigin,
}

/// Localizes single (beat, language) pairs.
///
/// Cheap to clone; every clone shares the translator, the request limiter
/// and the cache counters.
#[derive(Clone)]
pub struct BeatLocalizer {
    translator: Arc<dyn Translator>,
    segmenter: Arc<Segmenter>,
    normalizer: Arc<Normalizer>,
    limiter: Arc<Semaphore>,
    stats: Arc<CacheStats>,
    resegment_cached: bool,
}

impl BeatLocalizer {
    /// Localizer with the default segmenter, the built-in rules and a cap of 8 calls
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            segmenter: Arc::new(Segmenter::default()),
            normalizer: Arc::new(Normalizer::with_builtin_rules()),
            limiter: request_limiter(8),
            stats: Arc::new(CacheStats::new()),
            resegment_cached: true,
        }
    }

    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = Arc::new(segmenter);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Cap concurrent translator calls across all clones
    pub fn with_concurrency_limit(mut self, max_concurrent_requests: usize) -> Self {
        self.limiter = request_limiter(max_concurrent_requests);
        self
    }

    /// When false, cached entries that already carry speech forms are kept as they are
    pub fn with_resegment_cached(mut self, resegment_cached: bool) -> Self {
        self.resegment_cached = resegment_cached;
        self
    }

    /// Cache gate counters for this localizer
    pub fn cache_stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Localize `beat` into `target_language`.
    ///
    /// Only the translator call can suspend; it runs while holding one permit
    /// of the shared limiter.
    pub async fn localize(
        &self,
        beat: &StudioBeat,
        beat_index: usize,
        source_language: &str,
        target_language: &str,
    ) -> Result<Localization, LocalizeError> {
        let decision = cache::decide(beat, source_language, target_language);
        self.stats.record(&decision);

        let (text, origin) = match decision {
            CacheDecision::Cached(text) => {
                if !self.resegment_cached {
                    if let Some(existing) = beat
                        .localized(target_language)
                        .filter(|entry| entry.has_speech_forms())
                    {
                        let mut kept = existing.clone();
                        kept.lang = target_language.to_string();
                        return Ok(Localization {
                            text: kept,
                            origin: TextOrigin::Cached,
                        });
                    }
                }
                (text, TextOrigin::Cached)
            }
            CacheDecision::Identity(text) => (text, TextOrigin::Identity),
            CacheDecision::Recompute => {
                let translated = {
                    let _permit = self
                        .limiter
                        .acquire()
                        .await
                        .map_err(|_| LocalizeError::Cancelled)?;
                    self.translator
                        .translate(&beat.text, source_language, target_language)
                        .await
                };
                let text = translated.map_err(|source| LocalizeError::Translation {
                    beat_index,
                    language: target_language.to_string(),
                    source,
                })?;
                (text, TextOrigin::Translated)
            }
        };

        Ok(Localization {
            text: self.speech_forms(text, target_language)?,
            origin,
        })
    }

    fn speech_forms(&self, text: String, language: &str) -> Result<LocalizedText, LocalizeError> {
        let texts = self.segmenter.segment(&text, language)?;
        let tts_texts = self.normalizer.normalize_all(&texts, language);
        Ok(LocalizedText {
            lang: language.to_string(),
            text,
            texts: Some(texts),
            tts_texts: Some(tts_texts),
        })
    }
}
