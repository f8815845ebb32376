//! Work the controller hands out, and the runner that performs it.
//!
//! The controller never awaits anything itself. It returns a [`JobRequest`],
//! the runtime drives it through [`JobRunner::run`], and the resulting
//! [`JobOutcome`] goes back to the controller.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use lab_client::{GenerationResult, GenerationService};
use lab_core::prompt::{
    GENERATE_ERROR_MESSAGE, GENERATING_MESSAGE, REFINE_ERROR_MESSAGE, REFINING_MESSAGE,
};
use lab_core::{Control, GalleryEntry, ImageData};
use lab_export::{export_file_name, SessionExporter};
use tracing::{debug, instrument};

use crate::sink::ArtifactSink;

/// Which text operation a job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Fresh generation from a preset or prompt.
    Generate,
    /// Refinement of the current concept.
    Refine,
}

impl TextKind {
    /// Console text while the job runs.
    #[must_use]
    pub fn busy_message(self) -> &'static str {
        match self {
            Self::Generate => GENERATING_MESSAGE,
            Self::Refine => REFINING_MESSAGE,
        }
    }

    /// Console text when the job fails.
    #[must_use]
    pub fn error_message(self) -> &'static str {
        match self {
            Self::Generate => GENERATE_ERROR_MESSAGE,
            Self::Refine => REFINE_ERROR_MESSAGE,
        }
    }
}

/// Identifies a text job so stale results can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextTicket {
    /// Sequence number; only the latest issued one is applied.
    pub seq: u64,
    /// Control to re-enable when the job ends.
    pub control: Control,
    /// Generate or refine.
    pub kind: TextKind,
}

/// Identifies an image job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTicket {
    /// Sequence number; only the latest issued one is applied.
    pub seq: u64,
}

/// Work to perform off the controller.
#[derive(Debug, Clone)]
pub enum JobRequest {
    /// Generate concept text.
    Text {
        /// Job identity.
        ticket: TextTicket,
        /// Full prompt to send.
        prompt: String,
    },
    /// Manifest concept images.
    Images {
        /// Job identity.
        ticket: ImageTicket,
        /// Concept text to draw.
        concept: String,
        /// Requested image count.
        count: u32,
        /// Generation counter value for the prompt.
        iteration: u64,
    },
    /// Synthesize and play narration.
    Speech {
        /// Control to re-enable when done.
        control: Control,
        /// Text to speak.
        text: String,
    },
    /// Render and save the session document.
    Export {
        /// Console text to print.
        text: String,
        /// Gallery entries, one page each.
        entries: Vec<GalleryEntry>,
    },
}

/// Narration handed to playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDelivery {
    /// Where the WAV went.
    pub location: String,
    /// Clip length in milliseconds.
    pub duration_ms: u64,
}

/// A saved export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDelivery {
    /// Path of the saved document.
    pub path: PathBuf,
    /// Page count.
    pub pages: usize,
}

/// Result of a finished job.
#[derive(Debug)]
pub enum JobOutcome {
    /// Text job finished.
    Text {
        /// Job identity.
        ticket: TextTicket,
        /// Generated text or failure.
        result: GenerationResult<String>,
    },
    /// Image job finished.
    Images {
        /// Job identity.
        ticket: ImageTicket,
        /// Images or failure.
        result: GenerationResult<Vec<ImageData>>,
    },
    /// Speech job finished. `Ok(None)` means the response had no audio.
    Speech {
        /// Control to re-enable.
        control: Control,
        /// Delivery or failure.
        result: anyhow::Result<Option<AudioDelivery>>,
    },
    /// Export job finished.
    Export {
        /// Delivery or failure.
        result: anyhow::Result<ExportDelivery>,
    },
}

/// Performs jobs against the generation service, exporter and sink.
pub struct JobRunner {
    service: GenerationService,
    exporter: Arc<SessionExporter>,
    sink: Arc<dyn ArtifactSink>,
}

impl JobRunner {
    /// Create a runner.
    #[must_use]
    pub fn new(
        service: GenerationService,
        exporter: SessionExporter,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            service,
            exporter: Arc::new(exporter),
            sink,
        }
    }

    /// Perform one job to completion.
    #[instrument(skip_all)]
    pub async fn run(&self, request: JobRequest) -> JobOutcome {
        match request {
            JobRequest::Text { ticket, prompt } => {
                debug!(seq = ticket.seq, control = %ticket.control, "Text job started");
                JobOutcome::Text {
                    ticket,
                    result: self.service.generate_text(&prompt, &[]).await,
                }
            }
            JobRequest::Images {
                ticket,
                concept,
                count,
                iteration,
            } => {
                debug!(seq = ticket.seq, count, iteration, "Image job started");
                JobOutcome::Images {
                    ticket,
                    result: self
                        .service
                        .generate_images(&concept, count, iteration)
                        .await,
                }
            }
            JobRequest::Speech { control, text } => JobOutcome::Speech {
                control,
                result: self.speak(&text).await,
            },
            JobRequest::Export { text, entries } => JobOutcome::Export {
                result: self.export(text, entries).await,
            },
        }
    }

    async fn speak(&self, text: &str) -> anyhow::Result<Option<AudioDelivery>> {
        let Some(clip) = self.service.synthesize_speech(text).await? else {
            return Ok(None);
        };
        let location = self.sink.play_audio(clip.to_wav()).await?;
        Ok(Some(AudioDelivery {
            location,
            duration_ms: clip.duration_ms(),
        }))
    }

    async fn export(
        &self,
        text: String,
        entries: Vec<GalleryEntry>,
    ) -> anyhow::Result<ExportDelivery> {
        let exporter = Arc::clone(&self.exporter);
        let exported_at = Utc::now();
        let document =
            tokio::task::spawn_blocking(move || exporter.render(&text, &entries, exported_at))
                .await
                .context("export task panicked")??;

        let pages = document.pages;
        let path = self
            .sink
            .save_document(&export_file_name(exported_at), document.bytes)
            .await?;
        Ok(ExportDelivery { path, pages })
    }
}
