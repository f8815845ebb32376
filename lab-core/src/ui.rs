//! What the front end shows, and the messages that keep it in sync.
//!
//! The session controller owns a [`ViewState`] and publishes a
//! [`StateUpdate`] for every change. Front ends consume [`UiEvent`]s in
//! the other direction.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::gallery::EntryId;
use crate::prompt::CorePreset;
use crate::session::PLACEHOLDER;

/// Controls that can be marked busy while a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// "Magic" preset core.
    Magic,
    /// "Storm" preset core.
    Storm,
    /// "Trend" preset core.
    Trend,
    /// Free-form generate prompt.
    Prompt,
    /// Refinement send control.
    Refine,
    /// Manifest one image.
    ManifestOne,
    /// Manifest four images.
    ManifestFour,
    /// Speak the console text.
    Voice,
    /// Speak the current selection.
    Listen,
    /// Export the session.
    Export,
}

impl Control {
    /// Control that triggers a given preset.
    #[must_use]
    pub fn for_preset(preset: CorePreset) -> Self {
        match preset {
            CorePreset::Magic => Self::Magic,
            CorePreset::Storm => Self::Storm,
            CorePreset::Trend => Self::Trend,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Magic => "magic",
            Self::Storm => "storm",
            Self::Trend => "trend",
            Self::Prompt => "prompt",
            Self::Refine => "refine",
            Self::ManifestOne => "manifest_one",
            Self::ManifestFour => "manifest_four",
            Self::Voice => "voice",
            Self::Listen => "listen",
            Self::Export => "export",
        };
        f.write_str(name)
    }
}

/// Source of a text generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum PromptSource {
    /// One of the built-in cores.
    Preset(CorePreset),
    /// A free-form prompt typed by the user.
    Custom(String),
}

/// Events a front end raises on the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Generate a fresh concept description.
    Generate {
        /// What to generate from.
        prompt: PromptSource,
    },
    /// Refine the current concept with a user request.
    Refine {
        /// The refinement request.
        text: String,
    },
    /// Manifest concept images from the current text.
    Manifest {
        /// Requested image count (clamped to 1..=4).
        count: u32,
    },
    /// Speak text aloud; `None` speaks the current console text.
    Speak {
        /// Explicit text to speak.
        text: Option<String>,
    },
    /// Speak a selection of the console text.
    Listen {
        /// Selected text.
        selection: String,
    },
    /// Remove one gallery entry.
    RemoveImage {
        /// Entry to remove.
        id: EntryId,
    },
    /// Remove every gallery entry and reset the generation counter.
    ClearGallery,
    /// Export the session as a PDF.
    Export,
    /// Manual edit of the console text.
    Edit {
        /// New console contents.
        text: String,
    },
}

/// Messages published whenever the view changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateUpdate {
    /// A control became busy or was re-enabled.
    ControlBusy {
        /// Which control.
        control: Control,
        /// Whether it is now busy.
        busy: bool,
    },
    /// The console text changed.
    Text {
        /// New console text.
        text: String,
    },
    /// The action bar was shown or hidden.
    ActionBar {
        /// Visibility.
        visible: bool,
    },
    /// Gallery contents changed.
    Gallery {
        /// Entry ids in display order.
        entries: Vec<EntryId>,
        /// Entry to scroll into view.
        scroll_to: Option<EntryId>,
    },
    /// The export control was shown or hidden.
    ExportControl {
        /// Visibility.
        visible: bool,
    },
    /// The gallery's empty indicator changed.
    EmptyIndicator {
        /// Visibility.
        visible: bool,
        /// Message shown by the indicator.
        message: String,
    },
    /// The image loader was shown or hidden.
    ImageLoader {
        /// Visibility.
        visible: bool,
    },
    /// Synthesized speech is ready for playback.
    AudioReady {
        /// Where the WAV was delivered.
        location: String,
        /// Playback length in milliseconds.
        duration_ms: u64,
    },
    /// The session was exported.
    Exported {
        /// Path of the written document.
        path: PathBuf,
        /// Number of pages.
        pages: usize,
    },
    /// A non-fatal failure the user should see.
    Error {
        /// Human-readable message.
        message: String,
    },
}

impl StateUpdate {
    /// Serialize as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the update cannot be encoded.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Default message of the gallery's empty indicator.
pub const EMPTY_GALLERY_MESSAGE: &str = "No visuals manifested yet.";

/// Everything a front end needs to render the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Text shown in the console.
    pub console_text: String,
    /// Controls currently busy.
    pub busy: BTreeSet<Control>,
    /// Whether the action bar is shown.
    pub action_bar_visible: bool,
    /// Whether the export control is shown.
    pub export_visible: bool,
    /// Whether the gallery's empty indicator is shown.
    pub empty_indicator_visible: bool,
    /// Message of the empty indicator.
    pub empty_message: String,
    /// Whether the image loader is shown.
    pub image_loader_visible: bool,
    /// Gallery entry ids in display order.
    pub gallery: Vec<EntryId>,
    /// Entry to scroll into view.
    pub scroll_to: Option<EntryId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            console_text: PLACEHOLDER.to_string(),
            busy: BTreeSet::new(),
            action_bar_visible: false,
            export_visible: false,
            empty_indicator_visible: true,
            empty_message: EMPTY_GALLERY_MESSAGE.to_string(),
            image_loader_visible: false,
            gallery: Vec::new(),
            scroll_to: None,
        }
    }
}

impl ViewState {
    /// Whether a control is currently busy.
    #[must_use]
    pub fn is_busy(&self, control: Control) -> bool {
        self.busy.contains(&control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_shows_placeholder() {
        let view = ViewState::default();
        assert_eq!(view.console_text, PLACEHOLDER);
        assert!(!view.action_bar_visible);
        assert!(view.empty_indicator_visible);
        assert!(view.busy.is_empty());
    }

    #[test]
    fn state_update_json_is_tagged() {
        let update = StateUpdate::ControlBusy {
            control: Control::ManifestFour,
            busy: true,
        };
        let json = update.to_json().expect("serializes");
        assert_eq!(
            json,
            r#"{"type":"control_busy","control":"manifest_four","busy":true}"#
        );
    }

    #[test]
    fn ui_event_deserializes_from_tagged_json() {
        let event: UiEvent =
            serde_json::from_str(r#"{"type":"manifest","count":4}"#).expect("valid event");
        assert_eq!(event, UiEvent::Manifest { count: 4 });

        let event: UiEvent = serde_json::from_str(
            r#"{"type":"generate","prompt":{"source":"preset","value":"storm"}}"#,
        )
        .expect("valid event");
        assert_eq!(
            event,
            UiEvent::Generate {
                prompt: PromptSource::Preset(CorePreset::Storm)
            }
        );
    }

    #[test]
    fn preset_controls() {
        assert_eq!(Control::for_preset(CorePreset::Trend), Control::Trend);
        assert_eq!(Control::ManifestOne.to_string(), "manifest_one");
    }
}
