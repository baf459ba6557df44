/*!
 * Document merger.
 *
 * Runs the beat aggregator over every beat concurrently, puts the results
 * back in document order and applies the configured failure policy.
 */

use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::aggregator::{BeatAggregator, BeatOutcome};
use super::document::StudioDocument;
use super::localizer::TextOrigin;
use crate::errors::{BeatFailure, LocalizeError};

/// What the merger does when some (beat, language) tasks failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Discard the run and return `LocalizeError::Incomplete`
    Abort,
    /// Emit the document with `localizationErrors` markers on affected beats
    #[default]
    Mark,
}

/// Called with (completed beats, total beats) after each beat finishes
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizationReport {
    /// Beats in the document
    pub beats: usize,
    /// Languages produced by the external translator
    pub translated: usize,
    /// Languages reused from a prior run
    pub reused: usize,
    /// Languages equal to the source language
    pub identity: usize,
    /// Beats with at least one missing language
    pub failures: Vec<BeatFailure>,
    /// Wall time of the run
    pub duration: Duration,
}

impl LocalizationReport {
    /// Whether every beat got every language
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failed (beat, language) tasks
    pub fn failed_tasks(&self) -> usize {
        self.failures.iter().map(|f| f.failures.len()).sum()
    }

    /// One line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} beats localized in {:.1}s: {} translated, {} reused, {} identity, {} failed",
            self.beats,
            self.duration.as_secs_f64(),
            self.translated,
            self.reused,
            self.identity,
            self.failed_tasks()
        )
    }

    fn add(&mut self, outcome: &BeatOutcome) {
        self.translated += outcome.count(TextOrigin::Translated);
        self.reused += outcome.count(TextOrigin::Cached);
        self.identity += outcome.count(TextOrigin::Identity);
        if let Some(failure) = outcome.failure() {
            self.failures.push(failure);
        }
    }
}

/// Localizes whole documents
pub struct DocumentMerger {
    aggregator: BeatAggregator,
    default_language: String,
    target_languages: Vec<String>,
    policy: FailurePolicy,
    beat_concurrency: usize,
    progress: Option<ProgressCallback>,
}

impl DocumentMerger {
    /// Merger for the given languages with the `Mark` policy
    pub fn new(aggregator: BeatAggregator, default_language: &str, target_languages: Vec<String>) -> Self {
        Self {
            aggregator,
            default_language: default_language.to_string(),
            target_languages,
            policy: FailurePolicy::default(),
            beat_concurrency: 32,
            progress: None,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Beats in flight at once; translator calls are capped separately
    pub fn with_beat_concurrency(mut self, beat_concurrency: usize) -> Self {
        self.beat_concurrency = beat_concurrency.max(1);
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn target_languages(&self) -> &[String] {
        &self.target_languages
    }

    /// Localize every beat of `document`.
    ///
    /// Beats keep their input order whatever order they complete in. Under
    /// `Abort` any failed task turns the run into `LocalizeError::Incomplete`.
    pub async fn merge(
        &self,
        mut document: StudioDocument,
    ) -> Result<(StudioDocument, LocalizationReport), LocalizeError> {
        let start = Instant::now();
        let source_language = document.source_language(&self.default_language).to_string();
        let beats = std::mem::take(&mut document.beats);
        let total = beats.len();

        info!(
            "Localizing {} beats of '{}' from '{}' into [{}]",
            total,
            document.filename,
            source_language,
            self.target_languages.join(", ")
        );

        let aggregator = &self.aggregator;
        let source = source_language.as_str();
        let targets = self.target_languages.as_slice();

        let mut pending = stream::iter(beats.iter().enumerate())
            .map(move |(index, beat)| async move {
                (index, aggregator.aggregate(beat, index, source, targets).await)
            })
            .buffer_unordered(self.beat_concurrency);

        let mut outcomes = Vec::with_capacity(total);
        while let Some((index, result)) = pending.next().await {
            outcomes.push((index, result?));
            if let Some(progress) = &self.progress {
                progress(outcomes.len(), total);
            }
        }

        // Restore document order
        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = LocalizationReport {
            beats: total,
            ..LocalizationReport::default()
        };
        for (_, outcome) in &outcomes {
            report.add(outcome);
        }
        report.duration = start.elapsed();

        if !report.is_complete() {
            match self.policy {
                FailurePolicy::Abort => {
                    warn!(
                        "{} of {} beats have missing languages; discarding the run",
                        report.failures.len(),
                        total
                    );
                    return Err(LocalizeError::Incomplete(report.failures));
                }
                FailurePolicy::Mark => warn!(
                    "{} of {} beats have missing languages; marked in localizationErrors",
                    report.failures.len(),
                    total
                ),
            }
        }

        document.beats = outcomes.into_iter().map(|(_, outcome)| outcome.beat).collect();
        info!("{}", report.summary());
        Ok((document, report))
    }

    /// Like `merge`, but gives up as soon as `shutdown` resolves.
    ///
    /// In-flight translator calls are dropped and no document is returned.
    pub async fn merge_until<F>(
        &self,
        document: StudioDocument,
        shutdown: F,
    ) -> Result<(StudioDocument, LocalizationReport), LocalizeError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.merge(document) => result,
            _ = shutdown => {
                warn!("Localization cancelled; nothing will be written");
                Err(LocalizeError::Cancelled)
            }
        }
    }
}
