/*!
 * Translation cache gate.
 *
 * Decides per (beat, target language) whether a prior localization can be
 * reused or the external translator has to be called. The gate never calls
 * the translator itself, so it cannot fail.
 */

use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::document::StudioBeat;

/// Outcome of consulting the cache gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// A prior run already translated the unchanged source text
    Cached(String),
    /// Target and source language are the same
    Identity(String),
    /// The external translator has to be called
    Recompute,
}

impl CacheDecision {
    /// Text to use without translating, if any
    pub fn reused_text(&self) -> Option<&str> {
        match self {
            Self::Cached(text) | Self::Identity(text) => Some(text),
            Self::Recompute => None,
        }
    }
}

/// Decide whether `beat` needs a fresh translation into `target_language`.
pub fn decide(beat: &StudioBeat, source_language: &str, target_language: &str) -> CacheDecision {
    let source_unchanged = beat
        .localized(source_language)
        .is_some_and(|source| source.text == beat.text);

    if source_unchanged {
        if let Some(cached) = beat.localized(target_language).filter(|t| !t.text.is_empty()) {
            debug!(
                "Cache hit for '{}' ({} -> {})",
                truncate_text(&beat.text, 30),
                source_language,
                target_language
            );
            return CacheDecision::Cached(cached.text.clone());
        }
    }

    if target_language == source_language {
        return CacheDecision::Identity(beat.text.clone());
    }

    debug!(
        "Cache miss for '{}' ({} -> {})",
        truncate_text(&beat.text, 30),
        source_language,
        target_language
    );
    CacheDecision::Recompute
}

/// Counters of gate decisions over one run
#[derive(Debug, Default)]
pub struct CacheStats {
    cached: AtomicUsize,
    identity: AtomicUsize,
    recomputed: AtomicUsize,
}

impl CacheStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one decision
    pub fn record(&self, decision: &CacheDecision) {
        let counter = match decision {
            CacheDecision::Cached(_) => &self.cached,
            CacheDecision::Identity(_) => &self.identity,
            CacheDecision::Recompute => &self.recomputed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// (cached, identity, recomputed)
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.cached.load(Ordering::Relaxed),
            self.identity.load(Ordering::Relaxed),
            self.recomputed.load(Ordering::Relaxed),
        )
    }

    /// Share of decisions that avoided a translator call
    pub fn hit_rate(&self) -> f64 {
        let (cached, identity, recomputed) = self.snapshot();
        let total = cached + identity + recomputed;
        if total > 0 {
            (cached + identity) as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
