//! Session state: the current concept text and the generation counter.

use serde::{Deserialize, Serialize};

/// Sentence shown in the console before anything has been generated.
pub const PLACEHOLDER: &str = "System ready. Type your prompt below or select a core to begin ✨";

/// Manual edits must be longer than this (after trimming) to become the concept text.
pub const MIN_MANUAL_EDIT_LEN: usize = 5;

/// Result of applying a manual console edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit replaced the concept text.
    Accepted,
    /// The console was emptied; the concept text was cleared.
    Cleared,
    /// The edit was too short (or the placeholder) and changed nothing.
    Ignored,
}

/// One generation-and-refinement session.
///
/// `concept_text` is what the next image or speech request is generated from.
/// `generation_count` increments once per image manifestation and only goes
/// back to zero on an explicit gallery clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    concept_text: String,
    generation_count: u64,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current concept text.
    #[must_use]
    pub fn concept_text(&self) -> &str {
        &self.concept_text
    }

    /// Number of manifestation calls since the last explicit clear.
    #[must_use]
    pub fn generation_count(&self) -> u64 {
        self.generation_count
    }

    /// Replace the concept text with a generated or refined description.
    pub fn set_concept_text(&mut self, text: impl Into<String>) {
        self.concept_text = text.into();
    }

    /// Forget the concept text (start of a generate or refine).
    pub fn clear_concept_text(&mut self) {
        self.concept_text.clear();
    }

    /// Whether the concept text is something worth acting on.
    ///
    /// The action bar is shown exactly when this holds.
    #[must_use]
    pub fn has_concept(&self) -> bool {
        !self.concept_text.is_empty() && self.concept_text != PLACEHOLDER
    }

    /// Advance the generation counter, returning the new iteration number.
    pub fn next_generation(&mut self) -> u64 {
        self.generation_count = self.generation_count.saturating_add(1);
        self.generation_count
    }

    /// Reset the generation counter to zero.
    pub fn reset_generations(&mut self) {
        self.generation_count = 0;
    }

    /// Apply text the user typed directly into the console.
    pub fn apply_manual_edit(&mut self, input: &str) -> EditOutcome {
        let text = input.trim();
        if text.chars().count() > MIN_MANUAL_EDIT_LEN && text != PLACEHOLDER {
            self.concept_text = text.to_string();
            EditOutcome::Accepted
        } else if text.is_empty() {
            self.concept_text.clear();
            EditOutcome::Cleared
        } else {
            EditOutcome::Ignored
        }
    }
}
