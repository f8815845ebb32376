//! # Design Lab Core
//!
//! Session state for a generative design session, free of any I/O.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  lab-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Session         │  Gallery                 │
//! │  - Concept text  │  - Ordered entries       │
//! │  - Gen counter   │  - Remove by identity    │
//! ├─────────────────────────────────────────────┤
//! │  View state      │  Prompts & audio         │
//! │  - State updates │  - Templates, presets    │
//! │  - UI events     │  - PCM16 → WAV           │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod error;
pub mod gallery;
pub mod prompt;
pub mod session;
pub mod ui;

pub use audio::{pcm16_to_wav, SpeechClip, SPEECH_SAMPLE_RATE, WAV_HEADER_LEN};
pub use error::{CoreError, CoreResult};
pub use gallery::{EntryId, Gallery, GalleryEntry, ImageData, ImageFormat};
pub use prompt::CorePreset;
pub use session::{EditOutcome, Session, PLACEHOLDER};
pub use ui::{Control, PromptSource, StateUpdate, UiEvent, ViewState, EMPTY_GALLERY_MESSAGE};

/// Design Lab core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
