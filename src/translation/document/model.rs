/*!
 * Core document model types for studio localization.
 *
 * These types mirror the JSON studio document: an ordered list of beats with
 * per-language localized text. Fields the pipeline does not understand are
 * carried through untouched.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Language-keyed localized texts of a beat.
pub type MultiLingualTexts = BTreeMap<String, LocalizedText>;

/// Complete studio document.
///
/// Beat order is the narration order and is never changed by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioDocument {
    /// Base name used for output files
    #[serde(default)]
    pub filename: String,

    /// Script-level settings
    #[serde(default)]
    pub script: ScriptHeader,

    /// Ordered narration beats
    #[serde(default)]
    pub beats: Vec<StudioBeat>,

    /// Everything else in the document
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StudioDocument {
    /// Create a document from plain beat texts.
    pub fn from_texts<I, S>(filename: &str, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filename: filename.to_string(),
            script: ScriptHeader::default(),
            beats: texts.into_iter().map(StudioBeat::new).collect(),
            extra: Map::new(),
        }
    }

    /// Set the script language.
    pub fn with_lang(mut self, lang: &str) -> Self {
        self.script.lang = Some(lang.to_string());
        self
    }

    /// Language the beats are written in.
    ///
    /// The script's own language wins over the configured default.
    pub fn source_language<'a>(&'a self, default_language: &'a str) -> &'a str {
        match self.script.lang.as_deref() {
            Some(lang) if !lang.trim().is_empty() => lang,
            _ => default_language,
        }
    }

    /// Check if every beat carries an entry for every given language.
    pub fn is_fully_localized(&self, languages: &[String]) -> bool {
        self.beats.iter().all(|beat| {
            languages
                .iter()
                .all(|lang| beat.multi_lingual_texts.contains_key(lang))
        })
    }

    /// Number of (beat, language) failure markers in the document.
    pub fn failure_count(&self) -> usize {
        self.beats.iter().map(|beat| beat.localization_errors.len()).sum()
    }
}

/// Script-level settings of a studio document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptHeader {
    /// Language of the beat texts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Everything else in the script
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One narration beat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioBeat {
    /// Original text in the document's language
    #[serde(default)]
    pub text: String,

    /// Localized texts keyed by language code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub multi_lingual_texts: MultiLingualTexts,

    /// Languages that could not be produced on the last run, with the cause
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localization_errors: BTreeMap<String, String>,

    /// Everything else in the beat
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StudioBeat {
    /// Create a beat with the given original text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Localized entry for a language, if any.
    pub fn localized(&self, lang: &str) -> Option<&LocalizedText> {
        self.multi_lingual_texts.get(lang)
    }
}

/// Text of a beat in one language, with its speech-ready forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    /// Language code
    pub lang: String,

    /// Full localized text
    #[serde(default)]
    pub text: String,

    /// Segmented form, one entry per speech request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texts: Option<Vec<String>>,

    /// Pronunciation-normalized form of `texts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_texts: Option<Vec<String>>,
}

impl LocalizedText {
    /// Create an entry that only carries text.
    pub fn new(lang: &str, text: impl Into<String>) -> Self {
        Self {
            lang: lang.to_string(),
            text: text.into(),
            texts: None,
            tts_texts: None,
        }
    }

    /// Whether segmented and normalized forms are present and line up.
    pub fn has_speech_forms(&self) -> bool {
        match (&self.texts, &self.tts_texts) {
            (Some(texts), Some(tts_texts)) => {
                texts.len() == tts_texts.len() && (self.text.is_empty() || !texts.is_empty())
            }
            _ => false,
        }
    }
}
