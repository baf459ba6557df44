/*!
 * Segmentation properties checked over a grid of text lengths and limits
 */

use studio_localizer::translation::Segmenter;

const JAPANESE_SENTENCES: &[&str] = &[
    "今日は新しいモデルについて説明します。",
    "まず、背景を簡単に振り返りましょう。",
    "研究者たちは長い間この問題に取り組んできました",
    "その結果、性能は大きく向上しました！",
    "次に具体的な例を見ていきます、",
];

fn japanese_text(chars: usize) -> String {
    JAPANESE_SENTENCES
        .iter()
        .cycle()
        .flat_map(|sentence| sentence.chars())
        .take(chars)
        .collect()
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn assert_segments_cover(text: &str, segments: &[String], max_chars: usize) {
    assert!(!segments.is_empty(), "non-empty text must give segments");
    for segment in segments {
        assert!(
            segment.chars().count() <= max_chars,
            "segment {:?} exceeds {} chars",
            segment,
            max_chars
        );
        assert!(!segment.is_empty());
    }
    assert_eq!(strip_whitespace(&segments.concat()), strip_whitespace(text));
}

#[test]
fn test_segment_withJapaneseText_shouldRespectLimitForEveryLength() {
    for max_chars in [1, 5, 12, 40] {
        let segmenter = Segmenter::for_languages(max_chars, &["ja"]);
        for length in [1, 11, 39, 40, 41, 100, 517, 2000] {
            let text = japanese_text(length);
            let segments = segmenter.segment(&text, "ja").unwrap();
            assert_segments_cover(&text, &segments, max_chars);
        }
    }
}

#[test]
fn test_segment_withoutAnySplitPoint_shouldFallBackToMidpoints() {
    let segmenter = Segmenter::for_languages(8, &["ja"]);
    let text = "ア".repeat(100);

    let segments = segmenter.segment(&text, "ja").unwrap();

    assert_segments_cover(&text, &segments, 8);
}

#[test]
fn test_segment_withSpacedText_shouldDropBoundaryWhitespaceOnly() {
    let segmenter = Segmenter::for_languages(10, &["ja"]);
    let text = "これは テスト です。 次の 文章 も あります。 最後 の 文。";

    let segments = segmenter.segment(text, "ja").unwrap();

    assert_segments_cover(text, &segments, 10);
    assert!(segments.iter().all(|s| s.trim() == s));
}

#[test]
fn test_segment_withOversizedCluster_shouldKeepItWhole() {
    let segmenter = Segmenter::for_languages(4, &["ja"]);
    let cluster = format!("e{}", "\u{0301}".repeat(12));

    let segments = segmenter.segment(&cluster, "ja").unwrap();

    assert_eq!(segments, vec![cluster]);
}

#[test]
fn test_segment_withSentenceEndNearMiddle_shouldSplitThere() {
    let segmenter = Segmenter::for_languages(15, &["ja"]);
    let text = "今日は晴れです。明日は雨が降るでしょう。";

    let segments = segmenter.segment(text, "ja").unwrap();

    assert_eq!(segments, vec!["今日は晴れです。", "明日は雨が降るでしょう。"]);
}

#[test]
fn test_segment_withUnconfiguredLanguage_shouldReturnWholeText() {
    let segmenter = Segmenter::for_languages(5, &["ja"]);
    let text = "A long English sentence stays whole.";

    assert_eq!(segmenter.segment(text, "en").unwrap(), vec![text.to_string()]);
}
