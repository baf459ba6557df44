use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::translation::{
    BeatAggregator, BeatLocalizer, DocumentMerger, LocalizationReport, TranslationService, Translator,
};

// @module: Application controller for studio document localization

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller, rejecting invalid configuration up front
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Assemble the localization pipeline around a translator
    pub fn build_merger(&self, translator: Arc<dyn Translator>) -> Result<DocumentMerger> {
        let config = &self.config;
        let localizer = BeatLocalizer::new(translator)
            .with_segmenter(config.build_segmenter())
            .with_normalizer(config.build_normalizer()?)
            .with_concurrency_limit(config.translation.optimal_concurrent_requests())
            .with_resegment_cached(config.resegment_cached);

        Ok(DocumentMerger::new(
            BeatAggregator::new(localizer),
            &config.default_language,
            config.target_languages.clone(),
        )
        .with_policy(config.failure_policy))
    }

    /// Localize `input_file` with the configured provider and write the result to `output_dir`.
    ///
    /// Ctrl-C cancels the run; nothing is written in that case.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf) -> Result<(PathBuf, LocalizationReport)> {
        let service = Arc::new(
            TranslationService::new(self.config.translation.clone())
                .context("Failed to create translation service")?,
        );
        info!(
            "Using {} ({}) with up to {} concurrent requests",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            self.config.translation.optimal_concurrent_requests()
        );

        let result = self
            .run_with_translator(&input_file, &output_dir, service.clone(), shutdown_signal())
            .await;

        let usage = service.usage();
        if usage.requests > 0 {
            info!("{}", usage.summary());
        }
        result
    }

    /// Localize with any translator, stopping early when `shutdown` resolves
    pub async fn run_with_translator<F>(
        &self,
        input_file: &Path,
        output_dir: &Path,
        translator: Arc<dyn Translator>,
        shutdown: F,
    ) -> Result<(PathBuf, LocalizationReport)>
    where
        F: Future<Output = ()>,
    {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let mut document = FileManager::read_document(input_file)?;
        if document.filename.is_empty() {
            document.filename = input_file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "studio".to_string());
        }

        let source = document.source_language(&self.config.default_language).to_string();
        info!(
            "Source language: {}, targets: {}",
            language_utils::language_label(&source),
            self.config
                .target_languages
                .iter()
                .map(|code| language_utils::language_label(code))
                .collect::<Vec<_>>()
                .join(", ")
        );
        for code in &self.config.target_languages {
            if !language_utils::is_known_language(code) {
                warn!("'{}' is not an ISO language code; it is passed to the translator as is", code);
            }
        }

        let output_path = FileManager::studio_output_path(output_dir, &document.filename);

        let progress_bar = ProgressBar::new(document.beats.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} beats ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Localizing");

        let bar = progress_bar.clone();
        let merger = self
            .build_merger(translator)?
            .with_progress(move |done, _total| bar.set_position(done as u64));

        let result = merger.merge_until(document, shutdown).await;
        progress_bar.finish_and_clear();

        let (document, report) = result?;
        FileManager::write_document(&output_path, &document)?;

        if report.is_complete() {
            info!("Success: {:?}", output_path);
        } else {
            warn!(
                "Written with {} missing translations, re-run to retry them: {:?}",
                report.failed_tasks(),
                output_path
            );
        }
        Ok((output_path, report))
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Could not listen for Ctrl-C; the run cannot be cancelled");
        std::future::pending::<()>().await;
    }
}
