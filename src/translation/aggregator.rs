/*!
 * Beat aggregator.
 *
 * Runs the beat localizer for every target language of one beat
 * concurrently and folds the per-language results into a new beat.
 */

use futures::future::join_all;
use log::warn;
use std::collections::BTreeMap;

use super::document::{MultiLingualTexts, StudioBeat};
use super::localizer::{BeatLocalizer, TextOrigin};
use crate::errors::{BeatFailure, LanguageFailure, LocalizeError};

/// Everything one beat produced in a run
#[derive(Debug, Clone, PartialEq)]
pub struct BeatOutcome {
    /// Position of the beat in the document
    pub beat_index: usize,
    /// The beat with its rebuilt `multiLingualTexts` and failure markers
    pub beat: StudioBeat,
    /// Languages that could not be produced, in configured order
    pub failures: Vec<LanguageFailure>,
    /// How each produced language was obtained
    pub origins: BTreeMap<String, TextOrigin>,
}

impl BeatOutcome {
    /// Whether every target language was produced
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failed languages of this beat, if any
    pub fn failure(&self) -> Option<BeatFailure> {
        (!self.failures.is_empty()).then(|| BeatFailure {
            beat_index: self.beat_index,
            failures: self.failures.clone(),
        })
    }

    /// Number of languages obtained a given way
    pub fn count(&self, origin: TextOrigin) -> usize {
        self.origins.values().filter(|o| **o == origin).count()
    }

    /// The localized beat, or the failure if any language is missing
    pub fn into_result(self) -> Result<StudioBeat, BeatFailure> {
        if self.failures.is_empty() {
            Ok(self.beat)
        } else {
            Err(BeatFailure {
                beat_index: self.beat_index,
                failures: self.failures,
            })
        }
    }
}

/// Localizes one beat into every target language
#[derive(Clone)]
pub struct BeatAggregator {
    localizer: BeatLocalizer,
}

impl BeatAggregator {
    pub fn new(localizer: BeatLocalizer) -> Self {
        Self { localizer }
    }

    pub fn localizer(&self) -> &BeatLocalizer {
        &self.localizer
    }

    /// Localize `beat` into all `target_languages`.
    ///
    /// Translator failures are collected per language; any other error ends
    /// the whole beat. The returned beat carries entries for target languages
    /// only, and `localizationErrors` lists this run's failures.
    pub async fn aggregate(
        &self,
        beat: &StudioBeat,
        beat_index: usize,
        source_language: &str,
        target_languages: &[String],
    ) -> Result<BeatOutcome, LocalizeError> {
        let results = join_all(target_languages.iter().map(|target| {
            self.localizer
                .localize(beat, beat_index, source_language, target)
        }))
        .await;

        let mut texts = MultiLingualTexts::new();
        let mut origins = BTreeMap::new();
        let mut failures = Vec::new();

        for (target, result) in target_languages.iter().zip(results) {
            match result {
                Ok(localization) => {
                    origins.insert(target.clone(), localization.origin);
                    texts.insert(target.clone(), localization.text);
                }
                Err(LocalizeError::Translation { source, .. }) => {
                    warn!("Beat {}: '{}' could not be translated: {}", beat_index, target, source);
                    failures.push(LanguageFailure {
                        language: target.clone(),
                        reason: source.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let mut localized = beat.clone();
        localized.multi_lingual_texts = texts;
        localized.localization_errors = failures
            .iter()
            .map(|f| (f.language.clone(), f.reason.clone()))
            .collect();

        Ok(BeatOutcome {
            beat_index,
            beat: localized,
            failures,
            origins,
        })
    }
}
