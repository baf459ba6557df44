//! Language utilities for locale code handling
//!
//! Language codes are opaque map keys to the pipeline; these helpers only
//! serve logging and configuration sanity checks. A code such as `en-US` is
//! looked up by its primary subtag.

use isolang::Language;

/// Resolve the ISO language behind a locale code, if any
fn lookup(code: &str) -> Option<Language> {
    let primary = code
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// Whether a code names an ISO 639-1 or ISO 639-3 language
pub fn is_known_language(code: &str) -> bool {
    lookup(code).is_some()
}

/// English name of a language, or the code itself when unknown
pub fn get_language_name(code: &str) -> String {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// "Japanese (ja)" style label for logs
pub fn language_label(code: &str) -> String {
    match lookup(code) {
        Some(lang) => format!("{} ({})", lang.to_name(), code),
        None => code.to_string(),
    }
}
