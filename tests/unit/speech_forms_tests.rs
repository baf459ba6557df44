/*!
 * Speech forms produced by the localizer: segments and their spoken rewrites
 */

use std::sync::Arc;

use studio_localizer::providers::mock::MockTranslator;
use studio_localizer::translation::{BeatLocalizer, Normalizer, Segmenter, StudioBeat, TextOrigin};

use crate::common;

const LONG_JAPANESE: &str = "本日はOpenAIとAnthropicの最新モデルについて、3つのポイントから説明します。\
まず、GPUの性能は前年比で40%向上しました。次に、気温は20℃〜25℃の範囲で安定しています。\
最後に、2人の研究者がAPIの使い方を紹介します";

fn localizer_with(mock: &MockTranslator, max_chars: usize) -> BeatLocalizer {
    BeatLocalizer::new(Arc::new(mock.clone()))
        .with_segmenter(Segmenter::for_languages(max_chars, &["ja"]))
        .with_normalizer(Normalizer::with_builtin_rules())
}

#[tokio::test]
async fn test_localize_withLongJapanese_shouldPairEveryTtsTextWithItsSegment() {
    common::init_logging();
    let mock = MockTranslator::working().with_responses([(
        ("Long source.".to_string(), "ja".to_string()),
        LONG_JAPANESE.to_string(),
    )]);
    let normalizer = Normalizer::with_builtin_rules();

    for max_chars in [8, 20, 40, 80] {
        let beat = StudioBeat::new("Long source.");
        let localization = localizer_with(&mock, max_chars)
            .localize(&beat, 0, "en", "ja")
            .await
            .unwrap();

        assert_eq!(localization.origin, TextOrigin::Translated);
        let texts = localization.text.texts.clone().unwrap();
        let tts_texts = localization.text.tts_texts.clone().unwrap();

        assert_eq!(texts.len(), tts_texts.len());
        assert!(texts.len() > 1);
        for (segment, spoken) in texts.iter().zip(&tts_texts) {
            assert!(segment.chars().count() <= max_chars);
            assert_eq!(spoken, &normalizer.normalize(segment, "ja"));
        }
    }
}

#[tokio::test]
async fn test_localize_withWaveDash_shouldReadItAsKara() {
    let mock = MockTranslator::working().with_responses([(
        ("Open 9 to 5.".to_string(), "ja".to_string()),
        "9時〜5時".to_string(),
    )]);
    let beat = StudioBeat::new("Open 9 to 5.");

    let localization = localizer_with(&mock, 40)
        .localize(&beat, 0, "en", "ja")
        .await
        .unwrap();

    assert_eq!(localization.text.texts, Some(vec!["9時〜5時".to_string()]));
    assert_eq!(localization.text.tts_texts, Some(vec!["9時から5時".to_string()]));
}

#[tokio::test]
async fn test_localize_withTermsInJapanese_shouldRewriteWithoutTouchingText() {
    let mock = MockTranslator::working().with_responses([(
        ("Growth".to_string(), "ja".to_string()),
        "GPUは40%速い".to_string(),
    )]);
    let beat = StudioBeat::new("Growth");

    let localization = localizer_with(&mock, 40)
        .localize(&beat, 0, "en", "ja")
        .await
        .unwrap();

    assert_eq!(localization.text.text, "GPUは40%速い");
    assert_eq!(
        localization.text.tts_texts,
        Some(vec!["ジーピーユーは40パーセント速い".to_string()])
    );
}

#[tokio::test]
async fn test_localize_withEnglishTarget_shouldKeepSingleUnchangedSegment() {
    let mock = MockTranslator::working();
    let beat = StudioBeat::new("こんにちは");

    let localization = localizer_with(&mock, 5)
        .localize(&beat, 0, "ja", "en")
        .await
        .unwrap();

    let text = localization.text.text.clone();
    assert_eq!(localization.text.texts, Some(vec![text.clone()]));
    assert_eq!(localization.text.tts_texts, Some(vec![text]));
}

#[tokio::test]
async fn test_localize_withEmptyBeat_shouldProduceNoSegments() {
    let mock = MockTranslator::working();
    let beat = StudioBeat::new("");

    let localization = localizer_with(&mock, 40)
        .localize(&beat, 0, "ja", "ja")
        .await
        .unwrap();

    assert_eq!(localization.origin, TextOrigin::Identity);
    assert_eq!(localization.text.texts, Some(Vec::new()));
    assert_eq!(localization.text.tts_texts, Some(Vec::new()));
    assert_eq!(mock.call_count(), 0);
}
