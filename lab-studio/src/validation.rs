//! Validation of console input before it reaches the session.

use lab_core::EntryId;
use thiserror::Error;

/// Maximum length of a prompt or refinement request.
pub const MAX_PROMPT_LEN: usize = 8_000;
/// Image counts the console offers.
pub const ALLOWED_IMAGE_COUNTS: [u32; 2] = [1, 4];

/// Validation error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Prompt is empty after trimming.
    #[error("prompt is empty")]
    EmptyPrompt,
    /// Prompt exceeds maximum length.
    #[error("prompt too long (max {MAX_PROMPT_LEN} chars)")]
    PromptTooLong,
    /// Image count is not one the console offers.
    #[error("image count must be 1 or 4, got {0}")]
    InvalidImageCount(String),
    /// Gallery reference is neither a position nor an entry id.
    #[error("invalid gallery reference: {0}")]
    InvalidEntryRef(String),
}

/// A user's reference to a gallery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    /// 1-based position in the gallery.
    Position(usize),
    /// Entry id.
    Id(EntryId),
}

/// Validate a prompt, returning it trimmed.
///
/// # Errors
///
/// Returns an error if the prompt is empty or too long.
pub fn validate_prompt(prompt: &str) -> Result<&str, ValidationError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    if trimmed.chars().count() > MAX_PROMPT_LEN {
        return Err(ValidationError::PromptTooLong);
    }
    Ok(trimmed)
}

/// Parse an image count offered by the console.
///
/// # Errors
///
/// Returns an error unless the input is `1` or `4`.
pub fn validate_image_count(input: &str) -> Result<u32, ValidationError> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|count| ALLOWED_IMAGE_COUNTS.contains(count))
        .ok_or_else(|| ValidationError::InvalidImageCount(input.trim().to_string()))
}

/// Parse a gallery reference: a 1-based position or a UUID.
///
/// # Errors
///
/// Returns an error if the input is neither.
pub fn parse_entry_ref(input: &str) -> Result<EntryRef, ValidationError> {
    let input = input.trim();
    if let Ok(position) = input.parse::<usize>() {
        return if position == 0 {
            Err(ValidationError::InvalidEntryRef(input.to_string()))
        } else {
            Ok(EntryRef::Position(position))
        };
    }
    input
        .parse::<EntryId>()
        .map(EntryRef::Id)
        .map_err(|_| ValidationError::InvalidEntryRef(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_prompt() {
        assert_eq!(validate_prompt("  glossy nav  "), Ok("glossy nav"));
        assert_eq!(validate_prompt(" \n "), Err(ValidationError::EmptyPrompt));
        let long = "a".repeat(MAX_PROMPT_LEN + 1);
        assert_eq!(validate_prompt(&long), Err(ValidationError::PromptTooLong));
    }

    #[test]
    fn test_validate_image_count() {
        assert_eq!(validate_image_count("1"), Ok(1));
        assert_eq!(validate_image_count(" 4 "), Ok(4));
        assert!(validate_image_count("2").is_err());
        assert!(validate_image_count("four").is_err());
    }

    #[test]
    fn test_parse_entry_ref() {
        assert_eq!(parse_entry_ref("2"), Ok(EntryRef::Position(2)));
        assert!(parse_entry_ref("0").is_err());

        let id = EntryId::new();
        assert_eq!(parse_entry_ref(&id.to_string()), Ok(EntryRef::Id(id)));
        assert!(parse_entry_ref("third").is_err());
    }
}
