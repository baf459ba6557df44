/*!
 * Reading a studio file, localizing it and writing `<filename>_studio.json`
 */

use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use studio_localizer::app_config::{Config, TranslationProvider};
use studio_localizer::app_controller::Controller;
use studio_localizer::file_utils::FileManager;
use studio_localizer::providers::mock::MockTranslator;
use studio_localizer::translation::FailurePolicy;

use crate::common;

fn controller(targets: &[&str], policy: FailurePolicy) -> Result<Controller> {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.target_languages = common::languages(targets);
    config.failure_policy = policy;
    Controller::with_config(config)
}

#[tokio::test]
async fn test_run_withStudioFile_shouldWriteSuffixedOutput() -> Result<()> {
    common::init_logging();
    let dir = common::create_temp_dir()?;
    let input = common::write_studio_file(dir.path(), "input", &common::sample_document())?;
    let out_dir = dir.path().join("out");
    let mock = MockTranslator::working();

    let (path, report) = controller(&["ja", "en"], FailurePolicy::Mark)?
        .run_with_translator(&input, &out_dir, Arc::new(mock.clone()), std::future::pending())
        .await?;

    assert_eq!(path, out_dir.join("sample_studio.json"));
    assert!(report.is_complete());
    assert_eq!(mock.call_count(), 2);

    let written = FileManager::read_document(&path)?;
    assert_eq!(written.beats.len(), 2);
    assert_eq!(written.beats[0].localized("ja").unwrap().text, "[ja] Hello world.");
    assert_eq!(written.beats[1].localized("en").unwrap().text, "This is a test.");
    Ok(())
}

#[tokio::test]
async fn test_run_onItsOwnOutput_shouldNotCallTranslator() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::write_studio_file(dir.path(), "input", &common::sample_document())?;
    let controller = controller(&["ja", "en", "fr"], FailurePolicy::Mark)?;

    let first = MockTranslator::working();
    let (output, _) = controller
        .run_with_translator(&input, dir.path(), Arc::new(first.clone()), std::future::pending())
        .await?;
    let first_content = FileManager::read_to_string(&output)?;

    let second = MockTranslator::working();
    let (again, report) = controller
        .run_with_translator(&output, dir.path(), Arc::new(second.clone()), std::future::pending())
        .await?;

    assert_eq!(first.call_count(), 4);
    assert_eq!(second.call_count(), 0);
    assert_eq!(report.reused, 6);
    assert_eq!(again, output);
    assert_eq!(FileManager::read_to_string(&again)?, first_content);
    Ok(())
}

#[tokio::test]
async fn test_run_withUnknownFields_shouldPreserveThem() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = dir.path().join("rich.json");
    let document = json!({
        "title": "Quarterly update",
        "filename": "rich",
        "script": { "lang": "en", "speaker": "Presenter", "canvasSize": { "width": 1280, "height": 720 } },
        "beats": [
            {
                "text": "Hello world.",
                "speaker": "Presenter",
                "image": { "type": "textSlide", "title": "Intro" },
                "multiLingualTexts": {
                    "de": { "lang": "de", "text": "Hallo Welt." }
                }
            }
        ]
    });
    FileManager::write_to_file(&input, &serde_json::to_string_pretty(&document)?)?;

    let (path, _) = controller(&["ja", "en"], FailurePolicy::Mark)?
        .run_with_translator(
            &input,
            dir.path(),
            Arc::new(MockTranslator::working()),
            std::future::pending(),
        )
        .await?;

    let written: Value = serde_json::from_str(&FileManager::read_to_string(&path)?)?;
    assert_eq!(written["title"], "Quarterly update");
    assert_eq!(written["script"]["speaker"], "Presenter");
    assert_eq!(written["script"]["canvasSize"]["width"], 1280);
    let beat = &written["beats"][0];
    assert_eq!(beat["speaker"], "Presenter");
    assert_eq!(beat["image"]["title"], "Intro");
    assert!(beat["multiLingualTexts"].get("de").is_none());
    assert_eq!(beat["multiLingualTexts"]["ja"]["text"], "[ja] Hello world.");
    assert_eq!(beat["multiLingualTexts"]["ja"]["ttsTexts"][0], "[ja] Hello world.");
    Ok(())
}

#[tokio::test]
async fn test_run_withoutFilename_shouldNameOutputAfterInput() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = dir.path().join("untitled.json");
    FileManager::write_to_file(&input, r#"{ "beats": [ { "text": "Hi." } ] }"#)?;

    let (path, _) = controller(&["en"], FailurePolicy::Mark)?
        .run_with_translator(
            &input,
            dir.path(),
            Arc::new(MockTranslator::working()),
            std::future::pending(),
        )
        .await?;

    assert_eq!(path, dir.path().join("untitled_studio.json"));
    Ok(())
}

#[tokio::test]
async fn test_run_withAbortPolicyAndFailure_shouldWriteNothing() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::write_studio_file(dir.path(), "input", &common::sample_document())?;

    let result = controller(&["ja", "en"], FailurePolicy::Abort)?
        .run_with_translator(
            &input,
            dir.path(),
            Arc::new(MockTranslator::failing_for("ja", None)),
            std::future::pending(),
        )
        .await;

    assert!(result.is_err());
    assert!(!FileManager::file_exists(dir.path().join("sample_studio.json")));
    Ok(())
}

#[tokio::test]
async fn test_run_withCancellation_shouldWriteNothing() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::write_studio_file(dir.path(), "input", &common::sample_document())?;

    let result = controller(&["ja", "en"], FailurePolicy::Mark)?
        .run_with_translator(
            &input,
            dir.path(),
            Arc::new(MockTranslator::slow(5_000)),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

    assert!(result.is_err());
    assert!(!FileManager::file_exists(dir.path().join("sample_studio.json")));
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;

    let result = controller(&["ja"], FailurePolicy::Mark)?
        .run_with_translator(
            &dir.path().join("missing.json"),
            dir.path(),
            Arc::new(MockTranslator::working()),
            std::future::pending(),
        )
        .await;

    assert!(result.is_err());
    Ok(())
}
