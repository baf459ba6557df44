/*!
 * Prompt templates for beat translation.
 */

/// System prompt template with `{source_language}` and `{target_language}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Default system prompt: translate into the given locale, plain text only.
    pub const LOCALE_TRANSLATOR: &'static str = "Please translate the given text into the language specified in language (in locale format, like en, ja, fr, ch). Preserve the meaning and reply with the translated text only, without any commentary.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(Self::LOCALE_TRANSLATOR)
    }
}

/// Build the user message for one beat.
///
/// The layout names the original language, the requested language, and the
/// text to translate under markdown headings.
pub fn build_user_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    format!(
        "## Original Language\n{}\n\n## Language\n{}\n\n## Target\n{}",
        source_language, target_language, text
    )
}
