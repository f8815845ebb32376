//! The session controller.
//!
//! ```text
//!            generate / refine                  success
//!   Idle ───────────────────────▶ Busy ─────────────────────▶ Idle (text shown)
//!    ▲                              │
//!    │                              │ failure
//!    └──────── next trigger ────── ErrorDisplayed (fixed message)
//! ```
//!
//! Image manifestation, narration and export run beside the text machine;
//! each marks its control busy and always re-enables it when the job ends.

use lab_core::prompt::{
    listen_selection, refine_prompt, EXPORT_ERROR_MESSAGE, MANIFEST_ERROR_MESSAGE,
    SPEECH_ERROR_MESSAGE,
};
use lab_core::{
    Control, CoreResult, EditOutcome, EntryId, Gallery, PromptSource, Session, StateUpdate,
    UiEvent, ViewState, EMPTY_GALLERY_MESSAGE, PLACEHOLDER,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::jobs::{ImageTicket, JobOutcome, JobRequest, TextKind, TextTicket};
use crate::notify::UiBus;

/// Notice published when there is no concept to act on yet.
pub const NO_CONCEPT_MESSAGE: &str = "Nothing to work from yet. Generate or type a concept first.";

/// Read-only view of the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Concept text.
    pub concept_text: String,
    /// Generation counter.
    pub generation_count: u64,
    /// What the front end shows.
    pub view: ViewState,
}

/// Owns the session, the gallery and the view, and sequences every action.
#[derive(Debug)]
pub struct SessionController {
    session: Session,
    gallery: Gallery,
    view: ViewState,
    bus: UiBus,
    text_seq: u64,
    image_seq: u64,
}

impl SessionController {
    /// Create a controller publishing to `bus`.
    #[must_use]
    pub fn new(bus: UiBus) -> Self {
        Self {
            session: Session::new(),
            gallery: Gallery::new(),
            view: ViewState::default(),
            bus,
            text_seq: 0,
            image_seq: 0,
        }
    }

    /// The session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The gallery.
    #[must_use]
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// The current view.
    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Snapshot of everything.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            concept_text: self.session.concept_text().to_string(),
            generation_count: self.session.generation_count(),
            view: self.view.clone(),
        }
    }

    /// Dispatch a front-end event, returning any job it starts.
    pub fn handle(&mut self, event: UiEvent) -> Option<JobRequest> {
        match event {
            UiEvent::Generate { prompt } => self.generate(prompt),
            UiEvent::Refine { text } => self.refine(&text),
            UiEvent::Manifest { count } => self.manifest(count),
            UiEvent::Speak { text } => self.speak(text),
            UiEvent::Listen { selection } => self.listen(&selection),
            UiEvent::RemoveImage { id } => {
                if let Err(e) = self.remove_image(id) {
                    self.notify_error(e.to_string());
                }
                None
            }
            UiEvent::ClearGallery => {
                self.clear_gallery();
                None
            }
            UiEvent::Export => self.export(),
            UiEvent::Edit { text } => {
                self.edit(&text);
                None
            }
        }
    }

    /// Generate a fresh concept from a preset or free-form prompt.
    pub fn generate(&mut self, source: PromptSource) -> Option<JobRequest> {
        let (control, prompt) = match source {
            PromptSource::Preset(preset) => (Control::for_preset(preset), preset.prompt().to_string()),
            PromptSource::Custom(prompt) => (Control::Prompt, prompt),
        };
        self.begin_text(control, TextKind::Generate, prompt)
    }

    /// Refine the current concept with a user request.
    pub fn refine(&mut self, request: &str) -> Option<JobRequest> {
        let request = request.trim();
        if request.is_empty() {
            return None;
        }
        let prompt = refine_prompt(self.session.concept_text(), request);
        self.begin_text(Control::Refine, TextKind::Refine, prompt)
    }

    fn begin_text(&mut self, control: Control, kind: TextKind, prompt: String) -> Option<JobRequest> {
        if self.view.is_busy(control) {
            debug!(%control, "Control busy, ignoring trigger");
            return None;
        }

        self.text_seq += 1;
        let ticket = TextTicket {
            seq: self.text_seq,
            control,
            kind,
        };
        info!(seq = ticket.seq, %control, ?kind, "Text job queued");

        self.session.clear_concept_text();
        self.set_text(kind.busy_message().to_string());
        self.set_action_bar(false);
        self.set_busy(control, true);
        self.clear_gallery();

        Some(JobRequest::Text { ticket, prompt })
    }

    /// Manifest `count` images (clamped to 1..=4 by the service) from the concept.
    pub fn manifest(&mut self, count: u32) -> Option<JobRequest> {
        if self.view.is_busy(Control::ManifestOne) || self.view.is_busy(Control::ManifestFour) {
            debug!("Manifestation already running, ignoring trigger");
            return None;
        }
        if !self.session.has_concept() {
            self.notify_error(NO_CONCEPT_MESSAGE.to_string());
            return None;
        }

        self.image_seq += 1;
        let ticket = ImageTicket {
            seq: self.image_seq,
        };
        let iteration = self.session.next_generation();
        info!(seq = ticket.seq, count, iteration, "Image job queued");

        // The previous batch goes; the counter keeps counting.
        self.gallery.clear();
        self.publish_gallery();
        self.set_export_control(false);
        self.set_empty_indicator(true, EMPTY_GALLERY_MESSAGE);
        self.set_busy(Control::ManifestOne, true);
        self.set_busy(Control::ManifestFour, true);
        self.set_image_loader(true);

        Some(JobRequest::Images {
            ticket,
            concept: self.session.concept_text().to_string(),
            count,
            iteration,
        })
    }

    /// Speak `text`, or the console text when `None`.
    pub fn speak(&mut self, text: Option<String>) -> Option<JobRequest> {
        if self.view.is_busy(Control::Voice) {
            return None;
        }
        let text = text.unwrap_or_else(|| self.view.console_text.clone());
        let text = text.trim();
        if text.is_empty() || text == PLACEHOLDER {
            self.notify_error(NO_CONCEPT_MESSAGE.to_string());
            return None;
        }

        self.set_busy(Control::Voice, true);
        Some(JobRequest::Speech {
            control: Control::Voice,
            text: text.to_string(),
        })
    }

    /// Speak a selection if it is long enough.
    pub fn listen(&mut self, selection: &str) -> Option<JobRequest> {
        if self.view.is_busy(Control::Listen) {
            return None;
        }
        let Some(text) = listen_selection(selection) else {
            debug!("Selection too short to listen to");
            return None;
        };

        let text = text.to_string();
        self.set_busy(Control::Listen, true);
        Some(JobRequest::Speech {
            control: Control::Listen,
            text,
        })
    }

    /// Remove one gallery entry.
    ///
    /// # Errors
    ///
    /// Returns [`lab_core::CoreError::EntryNotFound`] for an unknown id.
    pub fn remove_image(&mut self, id: EntryId) -> CoreResult<()> {
        self.gallery.remove(id)?;
        self.publish_gallery();
        if self.gallery.is_empty() {
            self.set_export_control(false);
            self.set_empty_indicator(true, EMPTY_GALLERY_MESSAGE);
        }
        Ok(())
    }

    /// Remove every entry and reset the generation counter.
    ///
    /// A batch still in flight is superseded and its images are dropped.
    pub fn clear_gallery(&mut self) {
        self.image_seq += 1;
        self.gallery.clear();
        self.session.reset_generations();
        self.publish_gallery();
        self.set_export_control(false);
        self.set_empty_indicator(true, EMPTY_GALLERY_MESSAGE);
    }

    /// Export the concept text and gallery.
    pub fn export(&mut self) -> Option<JobRequest> {
        if self.view.is_busy(Control::Export) {
            return None;
        }
        self.set_busy(Control::Export, true);
        Some(JobRequest::Export {
            text: self.session.concept_text().to_string(),
            entries: self.gallery.entries().to_vec(),
        })
    }

    /// Apply a manual edit of the console.
    pub fn edit(&mut self, text: &str) -> EditOutcome {
        let outcome = self.session.apply_manual_edit(text);
        match outcome {
            EditOutcome::Accepted => {
                self.set_text(self.session.concept_text().to_string());
                self.set_action_bar(true);
            }
            EditOutcome::Cleared => {
                self.set_text(String::new());
                self.set_action_bar(false);
            }
            EditOutcome::Ignored => {}
        }
        outcome
    }

    /// Apply a finished job.
    pub fn finish(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Text { ticket, result } => {
                self.set_busy(ticket.control, false);
                if ticket.seq != self.text_seq {
                    debug!(seq = ticket.seq, latest = self.text_seq, "Discarding superseded text result");
                    return;
                }
                match result {
                    Ok(text) => {
                        self.session.set_concept_text(text.clone());
                        self.set_text(text);
                        self.set_action_bar(self.session.has_concept());
                    }
                    Err(e) => {
                        warn!(seq = ticket.seq, "Text generation failed: {e}");
                        // A manual edit made while the job ran does not survive the error.
                        self.session.clear_concept_text();
                        self.set_text(ticket.kind.error_message().to_string());
                        self.set_action_bar(false);
                    }
                }
            }
            JobOutcome::Images { ticket, result } => {
                self.set_busy(Control::ManifestOne, false);
                self.set_busy(Control::ManifestFour, false);
                self.set_image_loader(false);
                if ticket.seq != self.image_seq {
                    debug!(seq = ticket.seq, latest = self.image_seq, "Discarding superseded image result");
                    return;
                }
                match result {
                    Ok(images) => {
                        let ids = self.gallery.append(images);
                        info!(count = ids.len(), "Images manifested");
                        self.publish_gallery();
                        self.set_empty_indicator(self.gallery.is_empty(), EMPTY_GALLERY_MESSAGE);
                        self.set_export_control(!self.gallery.is_empty());
                    }
                    Err(e) => {
                        warn!(seq = ticket.seq, "Image manifestation failed: {e}");
                        self.set_empty_indicator(true, MANIFEST_ERROR_MESSAGE);
                    }
                }
            }
            JobOutcome::Speech { control, result } => {
                self.set_busy(control, false);
                match result {
                    Ok(Some(delivery)) => self.bus.publish(StateUpdate::AudioReady {
                        location: delivery.location,
                        duration_ms: delivery.duration_ms,
                    }),
                    Ok(None) => debug!(%control, "No audio returned"),
                    Err(e) => {
                        warn!(%control, "Speech failed: {e:#}");
                        self.notify_error(SPEECH_ERROR_MESSAGE.to_string());
                    }
                }
            }
            JobOutcome::Export { result } => {
                self.set_busy(Control::Export, false);
                match result {
                    Ok(delivery) => {
                        info!(path = %delivery.path.display(), pages = delivery.pages, "Exported");
                        self.bus.publish(StateUpdate::Exported {
                            path: delivery.path,
                            pages: delivery.pages,
                        });
                    }
                    Err(e) => {
                        warn!("Export failed: {e:#}");
                        self.notify_error(EXPORT_ERROR_MESSAGE.to_string());
                    }
                }
            }
        }
    }

    fn notify_error(&self, message: String) {
        self.bus.publish(StateUpdate::Error { message });
    }

    fn set_text(&mut self, text: String) {
        if self.view.console_text != text {
            self.view.console_text.clone_from(&text);
            self.bus.publish(StateUpdate::Text { text });
        }
    }

    fn set_action_bar(&mut self, visible: bool) {
        if self.view.action_bar_visible != visible {
            self.view.action_bar_visible = visible;
            self.bus.publish(StateUpdate::ActionBar { visible });
        }
    }

    fn set_busy(&mut self, control: Control, busy: bool) {
        let changed = if busy {
            self.view.busy.insert(control)
        } else {
            self.view.busy.remove(&control)
        };
        if changed {
            self.bus.publish(StateUpdate::ControlBusy { control, busy });
        }
    }

    fn set_export_control(&mut self, visible: bool) {
        if self.view.export_visible != visible {
            self.view.export_visible = visible;
            self.bus.publish(StateUpdate::ExportControl { visible });
        }
    }

    fn set_empty_indicator(&mut self, visible: bool, message: &str) {
        if self.view.empty_indicator_visible != visible || self.view.empty_message != message {
            self.view.empty_indicator_visible = visible;
            self.view.empty_message = message.to_string();
            self.bus.publish(StateUpdate::EmptyIndicator {
                visible,
                message: message.to_string(),
            });
        }
    }

    fn set_image_loader(&mut self, visible: bool) {
        if self.view.image_loader_visible != visible {
            self.view.image_loader_visible = visible;
            self.bus.publish(StateUpdate::ImageLoader { visible });
        }
    }

    fn publish_gallery(&mut self) {
        let entries = self.gallery.ids();
        let scroll_to = self.gallery.scroll_target();
        if self.view.gallery != entries || self.view.scroll_to != scroll_to {
            self.view.gallery.clone_from(&entries);
            self.view.scroll_to = scroll_to;
            self.bus.publish(StateUpdate::Gallery { entries, scroll_to });
        }
    }
}
