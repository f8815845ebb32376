//! # Design Lab Export
//!
//! Renders the concept text and manifested images of a session into an
//! A4 PDF document.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod pdf;

pub use error::{ExportError, ExportResult};
pub use pdf::{export_file_name, wrap_text, ExportConfig, ExportedDocument, SessionExporter};
