//! # Design Lab Studio
//!
//! Session controller and console front end for Design Lab.
//!
//! ## Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p lab-studio
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap, converted into `LabConfig`
//! - `SessionController` - Owns session, gallery and view; turns events into jobs
//! - `JobRunner` - Performs jobs against the generation service, exporter and sink
//! - `runtime::run` - Single-task loop multiplexing commands and in-flight jobs
//! - `UiBus` - Broadcasts `StateUpdate`s to whatever front end is attached

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod console;
pub mod controller;
pub mod jobs;
pub mod notify;
pub mod runtime;
pub mod sink;
pub mod validation;

pub use config::{CliArgs, LabConfig};
pub use controller::{SessionController, SessionSnapshot};
pub use jobs::{JobOutcome, JobRequest, JobRunner};
pub use notify::UiBus;
pub use runtime::{run, Command, StudioHandle};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
