/*!
 * Pronunciation normalization for speech synthesis.
 *
 * Each language owns an ordered list of (pattern, replacement) rules. Rules
 * are data: adding a language or a word never touches the pipeline.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// One rewrite from written form to spoken form
#[derive(Debug, Clone)]
pub struct PronunciationRule {
    pattern: Regex,
    replacement: String,
    not_preceded_by: Option<fn(char) -> bool>,
    not_followed_by: Option<fn(char) -> bool>,
}

impl PronunciationRule {
    /// Rule matching `from` literally
    pub fn literal(from: &str, to: &str) -> Self {
        Self {
            pattern: Regex::new(&regex::escape(from)).expect("escaped literal is a valid regex"),
            replacement: to.replace('$', "$$"),
            not_preceded_by: None,
            not_followed_by: None,
        }
    }

    /// Rule matching a regular expression; `$1` style groups may be used in `to`
    pub fn pattern(pattern: &str, to: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: to.to_string(),
            not_preceded_by: None,
            not_followed_by: None,
        })
    }

    /// Skip matches whose preceding character satisfies `guard`
    pub fn not_preceded_by(mut self, guard: fn(char) -> bool) -> Self {
        self.not_preceded_by = Some(guard);
        self
    }

    /// Skip matches whose following character satisfies `guard`
    pub fn not_followed_by(mut self, guard: fn(char) -> bool) -> Self {
        self.not_followed_by = Some(guard);
        self
    }

    /// Match only when not glued to surrounding Latin letters
    pub fn standalone_word(self) -> Self {
        self.not_preceded_by(is_latin_letter)
            .not_followed_by(is_latin_letter)
    }

    /// The rule's pattern source
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// First non-empty match starting at or after `from` that passes the guards
    fn find_at<'t>(&self, text: &'t str, from: usize) -> Option<Captures<'t>> {
        let mut start = from;
        loop {
            let caps = self.pattern.captures_at(text, start)?;
            let whole = caps.get(0)?;
            if !whole.is_empty() && self.guards_pass(text, whole.start(), whole.end()) {
                return Some(caps);
            }
            // Resume one character after the rejected match start
            let step = text[whole.start()..].chars().next()?.len_utf8();
            start = whole.start() + step;
        }
    }

    fn guards_pass(&self, text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        let blocked_before = self.not_preceded_by.zip(before).is_some_and(|(guard, c)| guard(c));
        let blocked_after = self.not_followed_by.zip(after).is_some_and(|(guard, c)| guard(c));
        !blocked_before && !blocked_after
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('０'..='９').contains(&c)
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || ('Ａ'..='Ｚ').contains(&c) || ('ａ'..='ｚ').contains(&c)
}

/// Built-in Japanese reading rules
static JAPANESE_RULES: Lazy<Vec<PronunciationRule>> = Lazy::new(|| {
    let mut rules: Vec<PronunciationRule> = [
        // Company and technology names read in katakana
        ("OpenAI", "オープンエーアイ"),
        ("Anthropic", "アンソロピック"),
        ("NVIDIA", "エヌビディア"),
        ("Google", "グーグル"),
        ("ChatGPT", "チャットジーピーティー"),
        ("GPT", "ジーピーティー"),
        ("AGI", "エージーアイ"),
        ("GPU", "ジーピーユー"),
        ("API", "エーピーアイ"),
        ("AI", "エーアイ"),
    ]
    .into_iter()
    .map(|(from, to)| PronunciationRule::literal(from, to).standalone_word())
    .collect();

    // Counters that speech engines tend to read as on'yomi; "21人" is not "2ひとり"
    rules.extend(
        [
            ("1つ", "ひとつ"),
            ("2つ", "ふたつ"),
            ("3つ", "みっつ"),
            ("4つ", "よっつ"),
            ("5つ", "いつつ"),
            ("1人", "ひとり"),
            ("2人", "ふたり"),
        ]
        .into_iter()
        .map(|(from, to)| PronunciationRule::literal(from, to).not_preceded_by(is_digit)),
    );

    rules.push(PronunciationRule::literal("〜", "から"));
    rules.push(PronunciationRule::literal("～", "から"));
    rules.extend(
        [
            (r"(\d+(?:\.\d+)?)\s*%", "${1}パーセント"),
            (r"(\d+(?:\.\d+)?)\s*℃", "${1}度"),
        ]
        .into_iter()
        .filter_map(|(pattern, to)| PronunciationRule::pattern(pattern, to).ok()),
    );
    rules
});

/// Rewrites segments into their spoken form.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rules: HashMap<String, Vec<PronunciationRule>>,
}

impl Normalizer {
    /// Create a normalizer without rules (identity for every language).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with the built-in rule sets.
    pub fn with_builtin_rules() -> Self {
        Self::new().with_rules("ja", JAPANESE_RULES.clone())
    }

    /// Append rules for a language, after any already registered.
    pub fn with_rules(mut self, language: &str, rules: Vec<PronunciationRule>) -> Self {
        self.rules
            .entry(language.to_string())
            .or_default()
            .extend(rules);
        self
    }

    /// Rules applied to a language, in order.
    pub fn rules_for(&self, language: &str) -> &[PronunciationRule] {
        self.rules.get(language).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rewrite one segment.
    ///
    /// The text is scanned once from left to right. At each position the
    /// earliest match wins, ties go to the rule listed first, and replaced
    /// text is never scanned again by later rules. Empty matches are skipped.
    pub fn normalize(&self, text: &str, language: &str) -> String {
        let rules = self.rules_for(language);
        if rules.is_empty() || text.is_empty() {
            return text.to_string();
        }

        let mut output = String::with_capacity(text.len());
        let mut position = 0;

        while position < text.len() {
            let next = rules
                .iter()
                .filter_map(|rule| rule.find_at(text, position).map(|caps| (rule, caps)))
                .min_by_key(|(_, caps)| caps.get(0).map_or(usize::MAX, |m| m.start()));

            let Some((rule, caps)) = next else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            output.push_str(&text[position..whole.start()]);
            caps.expand(&rule.replacement, &mut output);
            position = whole.end();
        }

        output.push_str(&text[position..]);
        output
    }

    /// Rewrite every segment, keeping count and order.
    pub fn normalize_all(&self, segments: &[String], language: &str) -> Vec<String> {
        segments
            .iter()
            .map(|segment| self.normalize(segment, language))
            .collect()
    }
}
