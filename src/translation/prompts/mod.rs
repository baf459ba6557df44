/*!
 * Prompt construction for the external translator.
 *
 * This module provides:
 * - The configurable system prompt template
 * - The user message layout for a single beat
 */

pub mod templates;

// Re-export main types
pub use templates::{build_user_prompt, PromptTemplate};
