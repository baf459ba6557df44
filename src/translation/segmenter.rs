/*!
 * Speech-sized text segmentation.
 *
 * Most languages are spoken as one request per beat. Scripts without
 * whitespace word boundaries (Japanese) are split recursively near the
 * middle, preferring sentence ends, then clause ends, then word boundaries.
 */

use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::LocalizeError;

/// Default upper bound of characters per segment
pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 40;

/// Recursion guard; split points stay in the middle half so real text
/// never gets close to it
const MAX_SPLIT_DEPTH: usize = 128;

/// Characters that may follow a terminal mark and belong to the same sentence
const CLOSING_MARKS: &[char] = &['」', '』', '）', ')', '】', '〉', '》', '"', '”', '’', '\''];

/// Punctuation and particle tables for recursive splitting
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRules {
    /// Marks ending a sentence
    pub sentence_endings: Vec<char>,
    /// Marks ending a clause
    pub clause_endings: Vec<char>,
    /// Particles after which a new word may start
    pub particles: Vec<char>,
}

impl SplitRules {
    /// Rules for Japanese text
    pub fn japanese() -> Self {
        Self {
            sentence_endings: vec!['。', '！', '？', '!', '?', '．'],
            clause_endings: vec!['、', '，', ',', '；', ';', '：', ':'],
            particles: vec!['は', 'が', 'を', 'に', 'で', 'と', 'も', 'へ', 'の'],
        }
    }

    /// Rules for scripts with sentence punctuation but no particles
    pub fn punctuation_only() -> Self {
        Self {
            particles: Vec::new(),
            ..Self::japanese()
        }
    }

    /// Preference of the boundary before `units[boundary]`; lower is better
    fn tier(&self, units: &[&str], boundary: usize) -> Option<u8> {
        let before = last_char(units[boundary - 1]);
        let after = first_char(units[boundary]);

        if self.ends_sentence(units, boundary) {
            return Some(0);
        }
        if self.clause_endings.contains(&before)
            && !self.clause_endings.contains(&after)
            && !CLOSING_MARKS.contains(&after)
        {
            return Some(1);
        }
        if before.is_whitespace() && !after.is_whitespace() {
            return Some(2);
        }
        if self.particles.contains(&before) && !is_hiragana(after) && !after.is_whitespace() {
            return Some(2);
        }
        None
    }

    fn ends_sentence(&self, units: &[&str], boundary: usize) -> bool {
        let after = first_char(units[boundary]);
        if self.sentence_endings.contains(&after) || CLOSING_MARKS.contains(&after) {
            return false;
        }

        // Walk back over closing quotes so "。」" ends the sentence after the quote
        let mut index = boundary;
        while index > 0 && CLOSING_MARKS.contains(&last_char(units[index - 1])) {
            index -= 1;
        }
        index > 0 && self.sentence_endings.contains(&last_char(units[index - 1]))
    }
}

/// How a language is segmented
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationPolicy {
    /// The whole text is one segment
    Whole,
    /// Recursive splitting near the midpoint
    Recursive(SplitRules),
}

/// Splits localized text into speech-sized segments.
///
/// Lengths are counted in characters; splits only ever fall between
/// extended grapheme clusters.
#[derive(Debug, Clone)]
pub struct Segmenter {
    max_chars: usize,
    max_depth: usize,
    policies: HashMap<String, SegmentationPolicy>,
}

impl Segmenter {
    /// Create a segmenter that keeps every language whole.
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            max_depth: MAX_SPLIT_DEPTH,
            policies: HashMap::new(),
        }
    }

    /// Register a policy for a language.
    pub fn with_policy(mut self, language: &str, policy: SegmentationPolicy) -> Self {
        self.policies.insert(language.to_string(), policy);
        self
    }

    /// Limit the levels of recursive splitting; deeper text is a segmentation error.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Create a segmenter with recursive Japanese-style splitting for the given languages.
    pub fn for_languages<S: AsRef<str>>(max_chars: usize, recursive_languages: &[S]) -> Self {
        recursive_languages
            .iter()
            .fold(Self::new(max_chars), |segmenter, lang| {
                let rules = if lang.as_ref() == "ja" {
                    SplitRules::japanese()
                } else {
                    SplitRules::punctuation_only()
                };
                segmenter.with_policy(lang.as_ref(), SegmentationPolicy::Recursive(rules))
            })
    }

    /// Maximum characters per segment.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Policy applied to a language.
    pub fn policy_for(&self, language: &str) -> &SegmentationPolicy {
        self.policies
            .get(language)
            .unwrap_or(&SegmentationPolicy::Whole)
    }

    /// Split `text` into ordered segments.
    ///
    /// Empty text yields no segments; any other text yields at least one.
    pub fn segment(&self, text: &str, language: &str) -> Result<Vec<String>, LocalizeError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        match self.policy_for(language) {
            SegmentationPolicy::Whole => Ok(vec![text.to_string()]),
            SegmentationPolicy::Recursive(rules) => {
                let units: Vec<&str> = text.graphemes(true).collect();
                let mut segments = Vec::new();
                self.split_recursive(&units, rules, 0, language, &mut segments)?;
                if segments.is_empty() {
                    segments.push(text.trim().to_string());
                }
                Ok(segments)
            }
        }
    }

    fn split_recursive(
        &self,
        units: &[&str],
        rules: &SplitRules,
        depth: usize,
        language: &str,
        segments: &mut Vec<String>,
    ) -> Result<(), LocalizeError> {
        let length: usize = units.iter().map(|unit| unit.chars().count()).sum();
        if length <= self.max_chars {
            push_trimmed(units, segments);
            return Ok(());
        }

        if depth >= self.max_depth {
            return Err(LocalizeError::Segmentation {
                language: language.to_string(),
                reason: format!(
                    "exceeded {} levels of splitting on {} characters",
                    self.max_depth, length
                ),
            });
        }

        match find_split_point(units, rules) {
            Some(point) => {
                self.split_recursive(&units[..point], rules, depth + 1, language, segments)?;
                self.split_recursive(&units[point..], rules, depth + 1, language, segments)
            }
            None => {
                // A single grapheme cluster longer than the limit stays whole
                push_trimmed(units, segments);
                Ok(())
            }
        }
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::for_languages(DEFAULT_MAX_SEGMENT_CHARS, &["ja"])
    }
}

/// Best boundary index in `1..units.len()`, or None for a single cluster.
fn find_split_point(units: &[&str], rules: &SplitRules) -> Option<usize> {
    let len = units.len();
    if len < 2 {
        return None;
    }

    let mid = len / 2;
    let low = (len / 4).max(1);
    let high = (len - len / 4).min(len - 1);

    let best = (low..=high)
        .filter_map(|boundary| {
            rules
                .tier(units, boundary)
                .map(|tier| (tier, boundary.abs_diff(mid), boundary))
        })
        .min();

    // Without a preferred boundary, cut at the cluster boundary nearest the middle
    Some(best.map_or(mid, |(_, _, boundary)| boundary))
}

fn push_trimmed(units: &[&str], segments: &mut Vec<String>) {
    let segment = units.concat();
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
}

fn first_char(unit: &str) -> char {
    unit.chars().next().unwrap_or_default()
}

fn last_char(unit: &str) -> char {
    unit.chars().next_back().unwrap_or_default()
}

fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{309F}')
}
