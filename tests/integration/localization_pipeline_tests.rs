/*!
 * Whole-document localization: caching, ordering, failure policy and cancellation
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use studio_localizer::errors::LocalizeError;
use studio_localizer::providers::mock::MockTranslator;
use studio_localizer::translation::{
    BeatAggregator, BeatLocalizer, DocumentMerger, FailurePolicy, LocalizedText, StudioDocument,
};

use crate::common::{self, ConcurrencyProbe, ReverseDelayTranslator};

fn numbered_document(beats: usize) -> StudioDocument {
    StudioDocument::from_texts("numbered", (0..beats).map(|i| format!("beat {}", i)))
}

#[tokio::test]
async fn test_merge_withTwoBeats_shouldLocalizeEveryLanguage() {
    common::init_logging();
    let mock = MockTranslator::working().with_responses([
        (("Hello world.".to_string(), "ja".to_string()), "こんにちは世界。".to_string()),
        (("This is a test.".to_string(), "ja".to_string()), "これはテストです。".to_string()),
    ]);
    let merger = common::merger_for(Arc::new(mock.clone()), &["ja", "en"], FailurePolicy::Mark);

    let (merged, report) = assert_ok!(merger.merge(common::sample_document()).await);

    assert_eq!(mock.call_count(), 2);
    assert_eq!(mock.calls_for("en"), 0);
    assert!(report.is_complete());
    assert_eq!(report.translated, 2);
    assert_eq!(report.identity, 2);

    let first = &merged.beats[0];
    let ja = first.localized("ja").unwrap();
    assert_eq!(ja.text, "こんにちは世界。");
    assert_eq!(ja.texts, Some(vec!["こんにちは世界。".to_string()]));
    assert_eq!(ja.tts_texts, Some(vec!["こんにちは世界。".to_string()]));
    let en = first.localized("en").unwrap();
    assert_eq!(en.text, "Hello world.");
    assert_eq!(en.lang, "en");

    assert_eq!(merged.beats[1].localized("ja").unwrap().text, "これはテストです。");
    assert!(merged.is_fully_localized(&common::languages(&["ja", "en"])));
}

#[tokio::test]
async fn test_merge_withOnlySourceLanguage_shouldNotCallTranslator() {
    let mock = MockTranslator::working();
    let merger = common::merger_for(Arc::new(mock.clone()), &["en"], FailurePolicy::Mark);

    let (merged, report) = assert_ok!(merger.merge(common::sample_document()).await);

    assert_eq!(mock.call_count(), 0);
    assert_eq!(report.identity, 2);
    for beat in &merged.beats {
        assert_eq!(beat.localized("en").unwrap().text, beat.text);
    }
}

#[tokio::test]
async fn test_merge_withPreviousOutput_shouldReuseEverything() {
    let mock = MockTranslator::working();
    let merger = common::merger_for(Arc::new(mock.clone()), &["ja", "en", "fr"], FailurePolicy::Mark);

    let (first_run, _) = assert_ok!(merger.merge(common::sample_document()).await);
    let calls_after_first_run = mock.call_count();
    let (second_run, report) = assert_ok!(merger.merge(first_run.clone()).await);

    assert_eq!(calls_after_first_run, 4);
    assert_eq!(mock.call_count(), calls_after_first_run);
    assert_eq!(report.translated, 0);
    assert_eq!(report.reused, 6);
    assert_eq!(second_run, first_run);
}

#[tokio::test]
async fn test_merge_withEditedBeat_shouldRetranslateOnlyThatBeat() {
    let mock = MockTranslator::working();
    let merger = common::merger_for(Arc::new(mock.clone()), &["ja", "en"], FailurePolicy::Mark);

    let (mut document, _) = assert_ok!(merger.merge(common::sample_document()).await);
    document.beats[1].text = "This is an edited test.".to_string();
    let before = mock.call_count();

    let (merged, report) = assert_ok!(merger.merge(document).await);

    let new_calls = &mock.calls()[before..];
    assert_eq!(new_calls.len(), 1);
    assert_eq!(new_calls[0].text, "This is an edited test.");
    assert_eq!(new_calls[0].target_language, "ja");
    assert_eq!(report.reused, 2);
    assert_eq!(
        merged.beats[1].localized("ja").unwrap().text,
        "[ja] This is an edited test."
    );
    assert_eq!(merged.beats[1].localized("en").unwrap().text, "This is an edited test.");
    assert_eq!(merged.beats[0].localized("ja").unwrap().text, "[ja] Hello world.");
}

#[tokio::test]
async fn test_merge_withReversedCompletionOrder_shouldKeepInputOrder() {
    let translator = Arc::new(ReverseDelayTranslator { beats: 10, step_ms: 10 });
    let completed = Arc::new(AtomicUsize::new(0));
    let progress = Arc::clone(&completed);
    let merger = common::merger_for(translator, &["ja"], FailurePolicy::Mark).with_progress(move |done, total| {
        assert!(done <= total);
        progress.store(done, Ordering::SeqCst);
    });

    let (merged, _) = assert_ok!(merger.merge(numbered_document(10)).await);

    assert_eq!(completed.load(Ordering::SeqCst), 10);
    for (index, beat) in merged.beats.iter().enumerate() {
        assert_eq!(beat.text, format!("beat {}", index));
        assert_eq!(
            beat.localized("ja").unwrap().text,
            format!("beat {} (ja)", index)
        );
    }
}

#[tokio::test]
async fn test_merge_withConcurrencyLimit_shouldNeverExceedIt() {
    let probe = Arc::new(ConcurrencyProbe::default());
    let localizer = BeatLocalizer::new(probe.clone()).with_concurrency_limit(2);
    let merger = DocumentMerger::new(
        BeatAggregator::new(localizer),
        "en",
        common::languages(&["ja", "fr", "en"]),
    );

    let (_, report) = assert_ok!(merger.merge(numbered_document(12)).await);

    assert_eq!(probe.calls(), 24);
    assert!(probe.peak() >= 1);
    assert!(probe.peak() <= 2, "peak was {}", probe.peak());
    assert_eq!(report.translated, 24);
}

#[tokio::test]
async fn test_merge_withFailingLanguageUnderMark_shouldMarkAndKeepOthers() {
    common::init_logging();
    let mock = MockTranslator::failing_for("ja", Some("This is a test."));
    let merger = common::merger_for(Arc::new(mock.clone()), &["ja", "en"], FailurePolicy::Mark);

    let (merged, report) = assert_ok!(merger.merge(common::sample_document()).await);

    assert!(!report.is_complete());
    assert_eq!(report.failed_tasks(), 1);
    assert_eq!(report.failures[0].beat_index, 1);

    let failed = &merged.beats[1];
    assert!(failed.localized("ja").is_none());
    assert!(failed.localization_errors.contains_key("ja"));
    assert_eq!(failed.localized("en").unwrap().text, "This is a test.");

    let intact = &merged.beats[0];
    assert!(intact.localization_errors.is_empty());
    assert_eq!(intact.localized("ja").unwrap().text, "[ja] Hello world.");
    assert_eq!(merged.failure_count(), 1);
}

#[tokio::test]
async fn test_merge_afterMarkedFailure_shouldClearMarkerOnRetry() {
    let failing = MockTranslator::failing_for("ja", Some("This is a test."));
    let merger = common::merger_for(Arc::new(failing), &["ja", "en"], FailurePolicy::Mark);
    let (marked, _) = assert_ok!(merger.merge(common::sample_document()).await);

    let working = MockTranslator::working();
    let merger = common::merger_for(Arc::new(working.clone()), &["ja", "en"], FailurePolicy::Mark);
    let (retried, report) = assert_ok!(merger.merge(marked).await);

    assert!(report.is_complete());
    assert_eq!(working.call_count(), 1);
    assert_eq!(retried.failure_count(), 0);
    assert_eq!(retried.beats[1].localized("ja").unwrap().text, "[ja] This is a test.");
}

#[tokio::test]
async fn test_merge_withFailingLanguageUnderAbort_shouldReturnIncomplete() {
    let mock = MockTranslator::failing_for("ja", Some("This is a test."));
    let merger = common::merger_for(Arc::new(mock), &["ja", "en"], FailurePolicy::Abort);

    let error = assert_err!(merger.merge(common::sample_document()).await);

    match error {
        LocalizeError::Incomplete(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].beat_index, 1);
            assert_eq!(failures[0].languages(), vec!["ja"]);
        }
        other => panic!("expected Incomplete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_merge_withStaleSourceAndFailingTarget_shouldDropStaleTranslation() {
    let mut document = common::sample_document();
    let beat = &mut document.beats[0];
    beat.multi_lingual_texts
        .insert("en".into(), LocalizedText::new("en", "Hello old world."));
    beat.multi_lingual_texts
        .insert("ja".into(), LocalizedText::new("ja", "古い翻訳"));
    beat.multi_lingual_texts
        .insert("de".into(), LocalizedText::new("de", "Hallo Welt."));
    let merger = common::merger_for(
        Arc::new(MockTranslator::failing_for("ja", None)),
        &["ja", "en"],
        FailurePolicy::Mark,
    );

    let (merged, _) = assert_ok!(merger.merge(document).await);

    let beat = &merged.beats[0];
    assert!(beat.localized("ja").is_none());
    assert!(beat.localized("de").is_none());
    assert_eq!(beat.localized("en").unwrap().text, "Hello world.");
    assert!(beat.localization_errors.contains_key("ja"));
}

#[tokio::test]
async fn test_merge_withScriptLanguage_shouldUseItAsSource() {
    let mock = MockTranslator::working();
    let merger = common::merger_for(Arc::new(mock.clone()), &["ja", "en"], FailurePolicy::Mark);
    let document = StudioDocument::from_texts("japanese", ["こんにちは"]).with_lang("ja");

    let (merged, _) = assert_ok!(merger.merge(document).await);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].source_language, "ja");
    assert_eq!(calls[0].target_language, "en");
    assert_eq!(merged.beats[0].localized("ja").unwrap().text, "こんにちは");
}

#[tokio::test]
async fn test_mergeUntil_withShutdownSignal_shouldCancel() {
    let mock = MockTranslator::slow(5_000);
    let merger = common::merger_for(Arc::new(mock), &["ja", "en"], FailurePolicy::Mark);
    let shutdown = tokio::time::sleep(Duration::from_millis(50));

    let started = std::time::Instant::now();
    let error = assert_err!(merger.merge_until(common::sample_document(), shutdown).await);

    assert!(matches!(error, LocalizeError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_mergeUntil_withoutShutdown_shouldMatchMerge() {
    let mock = MockTranslator::working();
    let merger = common::merger_for(Arc::new(mock), &["ja", "en"], FailurePolicy::Mark);

    let (expected, _) = assert_ok!(merger.merge(common::sample_document()).await);
    let (merged, _) = assert_ok!(
        merger
            .merge_until(common::sample_document(), std::future::pending::<()>())
            .await
    );

    assert_eq!(merged, expected);
}
