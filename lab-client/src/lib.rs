//! # Design Lab Client
//!
//! Calls the Gemini text, Imagen image and Gemini TTS endpoints through a
//! single retrying JSON client.
//!
//! ```text
//! GenerationService ──▶ RetryingClient ──▶ POST {api_base}/models/{model}:{method}?key=…
//!        │                   │
//!        │                   └─ 5 retries, 1s · 2s · 4s · 8s · 16s
//!        └─ text / images / speech field extraction
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod gemini;
pub mod retry;

pub use error::{GenerationError, GenerationResult};
pub use gemini::{clamp_image_count, GenerationConfig, GenerationService};
pub use retry::{RetryConfig, RetryingClient};
