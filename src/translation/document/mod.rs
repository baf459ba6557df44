/*!
 * Document modeling for studio localization.
 *
 * This module provides the studio document model:
 * - Ordered beats with pass-through of unrelated fields
 * - Per-language localized texts with speech-ready forms
 * - Per-language failure markers
 */

pub mod model;

// Re-export types used by other modules
pub use model::{LocalizedText, MultiLingualTexts, ScriptHeader, StudioBeat, StudioDocument};
