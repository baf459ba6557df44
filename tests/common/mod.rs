/*!
 * Common test utilities for the studio-localizer test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use studio_localizer::errors::ProviderError;
use studio_localizer::file_utils::FileManager;
use studio_localizer::translation::{
    BeatAggregator, BeatLocalizer, DocumentMerger, FailurePolicy, StudioDocument, Translator,
};

/// Route `log` output through the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Owned list of language codes
pub fn languages(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

/// The two-beat English document used throughout the suite
pub fn sample_document() -> StudioDocument {
    StudioDocument::from_texts("sample", ["Hello world.", "This is a test."])
}

/// Merger over `translator` for an English source
pub fn merger_for(translator: Arc<dyn Translator>, targets: &[&str], policy: FailurePolicy) -> DocumentMerger {
    let localizer = BeatLocalizer::new(translator);
    DocumentMerger::new(BeatAggregator::new(localizer), "en", languages(targets)).with_policy(policy)
}

/// Writes a studio document as `<name>.json` in `dir`
pub fn write_studio_file(dir: &Path, name: &str, document: &StudioDocument) -> Result<PathBuf> {
    let path = dir.join(format!("{}.json", name));
    FileManager::write_document(&path, document)?;
    Ok(path)
}

/// Translator that sleeps longer for earlier beats, so beats finish in reverse order.
///
/// Beat texts are expected to end with their index, e.g. "beat 3".
#[derive(Debug)]
pub struct ReverseDelayTranslator {
    pub beats: u64,
    pub step_ms: u64,
}

#[async_trait]
impl Translator for ReverseDelayTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let index: u64 = text
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let delay = self.beats.saturating_sub(index) * self.step_ms;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(format!("{} ({})", text, target_language))
    }
}

/// Translator that records the highest number of overlapping calls
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for ConcurrencyProbe {
    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("[{}] {}", target_language, text))
    }
}
