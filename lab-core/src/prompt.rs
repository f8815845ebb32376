//! Prompt templates and fixed console messages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Persona sent as the system instruction of every text request.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional Creative Director specializing in Liquid-Glass glossy web designs. Provide highly detailed, vivid, and technical descriptions of concepts, focusing on textures, lighting, materiality, and user interaction. Keep responses focused and technical.";

/// Console text while a preset or custom prompt is generating.
pub const GENERATING_MESSAGE: &str = "✨ Processing logic flow...";
/// Console text while a refinement is running.
pub const REFINING_MESSAGE: &str = "✨ Refining core logic...";
/// Console text after a failed generation.
pub const GENERATE_ERROR_MESSAGE: &str = "Error in neural link. Try again.";
/// Console text after a failed refinement.
pub const REFINE_ERROR_MESSAGE: &str = "Error refining. Check connectivity.";
/// Empty-indicator text after a failed manifestation.
pub const MANIFEST_ERROR_MESSAGE: &str = "Manifestation error. Try again.";
/// Notice published when speech synthesis fails.
pub const SPEECH_ERROR_MESSAGE: &str = "Voice synthesis failed. Try again.";
/// Notice published when export fails.
pub const EXPORT_ERROR_MESSAGE: &str = "✨ Export Error";

/// Image prompts are truncated to this many characters.
pub const IMAGE_PROMPT_MAX_CHARS: usize = 300;

/// A selection must contain more words than this to be spoken.
pub const LISTEN_MIN_WORDS: usize = 15;

/// Built-in generation cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorePreset {
    /// Futuristic liquid-metal concept.
    Magic,
    /// Principles of high-end gloss UI.
    Storm,
    /// Trend forecast.
    Trend,
}

impl CorePreset {
    /// All presets, in display order.
    pub const ALL: [Self; 3] = [Self::Magic, Self::Storm, Self::Trend];

    /// The prompt this core sends.
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Magic => "Provide a comprehensive and detailed description for a futuristic web design concept that utilizes liquid metal and deep gloss shadows.",
            Self::Storm => "Explain in-depth the core technical and aesthetic principles required for professional high-end gloss UI design.",
            Self::Trend => "Provide an extensive and detailed forecast for the most influential digital design trend emerging in late 2026.",
        }
    }
}

impl fmt::Display for CorePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Magic => "magic",
            Self::Storm => "storm",
            Self::Trend => "trend",
        })
    }
}

impl FromStr for CorePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "magic" => Ok(Self::Magic),
            "storm" => Ok(Self::Storm),
            "trend" => Ok(Self::Trend),
            other => Err(format!("unknown core: {other}")),
        }
    }
}

/// Prompt asking for an updated description of `current` given a refinement request.
#[must_use]
pub fn refine_prompt(current: &str, request: &str) -> String {
    format!(
        "History: \"{current}\". User Refinement Request: {request}. Provide an updated design description."
    )
}

/// Full image prompt for one manifestation call.
///
/// `iteration` is the session's generation counter; embedding it keeps
/// repeated requests for the same text from returning identical images.
#[must_use]
pub fn image_prompt(concept: &str, iteration: u64) -> String {
    let truncated: String = concept.chars().take(IMAGE_PROMPT_MAX_CHARS).collect();
    format!(
        "Cinematic professional web design mockup, high-end metallic UI, {truncated}. Iteration {iteration}., 8k resolution, elegant lighting, studio shot"
    )
}

/// Text sent to the speech model.
#[must_use]
pub fn speech_prompt(text: &str) -> String {
    format!("Say smoothly and professionally: {text}")
}

/// Return the trimmed selection if it is long enough to be spoken.
#[must_use]
pub fn listen_selection(selection: &str) -> Option<&str> {
    let text = selection.trim();
    (text.split_whitespace().count() > LISTEN_MIN_WORDS).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_parse_case_insensitively() {
        assert_eq!("Magic".parse::<CorePreset>(), Ok(CorePreset::Magic));
        assert_eq!("storm".parse::<CorePreset>(), Ok(CorePreset::Storm));
        assert!("flood".parse::<CorePreset>().is_err());
        for preset in CorePreset::ALL {
            assert_eq!(preset.to_string().parse::<CorePreset>(), Ok(preset));
        }
    }

    #[test]
    fn refine_prompt_embeds_history() {
        let prompt = refine_prompt("Chrome cards", "add neon");
        assert_eq!(
            prompt,
            "History: \"Chrome cards\". User Refinement Request: add neon. Provide an updated design description."
        );
    }

    #[test]
    fn image_prompt_truncates_and_tags_iteration() {
        let long = "x".repeat(500);
        let prompt = image_prompt(&long, 3);
        assert!(prompt.contains(&format!("UI, {}. Iteration 3.,", "x".repeat(300))));
        assert!(!prompt.contains(&"x".repeat(301)));
        assert!(prompt.ends_with("studio shot"));
    }

    #[test]
    fn image_prompt_truncates_on_char_boundary() {
        let text = "é".repeat(400);
        let prompt = image_prompt(&text, 1);
        assert_eq!(prompt.matches('é').count(), 300);
    }

    #[test]
    fn listen_requires_more_than_fifteen_words() {
        let fifteen = vec!["word"; 15].join(" ");
        assert_eq!(listen_selection(&fifteen), None);

        let sixteen = format!("  {fifteen} more\n");
        assert_eq!(listen_selection(&sixteen), Some(sixteen.trim()));
        assert_eq!(listen_selection("   "), None);
    }
}
