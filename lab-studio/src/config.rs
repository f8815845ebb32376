//! Command-line and environment configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lab_client::gemini::{
    DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL, DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL,
    DEFAULT_VOICE, REDACTED,
};
use lab_client::{GenerationConfig, RetryConfig};

/// Command-line arguments for design-lab.
#[derive(Clone, Parser)]
#[command(name = "design-lab")]
#[command(about = "Generate, refine, visualize, narrate and export design concepts")]
#[command(version)]
pub struct CliArgs {
    /// API key for the Generative Language API
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// API base URL
    #[arg(long, env = "DESIGN_LAB_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Model used for concept text
    #[arg(long, env = "DESIGN_LAB_TEXT_MODEL", default_value = DEFAULT_TEXT_MODEL)]
    pub text_model: String,

    /// Model used for concept images
    #[arg(long, env = "DESIGN_LAB_IMAGE_MODEL", default_value = DEFAULT_IMAGE_MODEL)]
    pub image_model: String,

    /// Model used for narration
    #[arg(long, env = "DESIGN_LAB_SPEECH_MODEL", default_value = DEFAULT_SPEECH_MODEL)]
    pub speech_model: String,

    /// Prebuilt narration voice
    #[arg(long, env = "DESIGN_LAB_VOICE", default_value = DEFAULT_VOICE)]
    pub voice: String,

    /// Directory receiving narration WAVs and exported PDFs
    #[arg(long, env = "DESIGN_LAB_OUT_DIR", default_value = "design-lab-output")]
    pub out_dir: PathBuf,

    /// Retries after a failed request
    #[arg(long, env = "DESIGN_LAB_MAX_RETRIES", default_value = "5")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds (doubles each retry)
    #[arg(long, env = "DESIGN_LAB_BACKOFF_MS", default_value = "1000")]
    pub backoff_ms: u64,

    /// Per-attempt request timeout in seconds
    #[arg(long, env = "DESIGN_LAB_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Print state updates as JSON lines instead of console text
    #[arg(long)]
    pub events_json: bool,
}

impl fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliArgs")
            .field("api_key", &REDACTED)
            .field("api_base", &self.api_base)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("voice", &self.voice)
            .field("out_dir", &self.out_dir)
            .field("max_retries", &self.max_retries)
            .field("backoff_ms", &self.backoff_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("events_json", &self.events_json)
            .finish()
    }
}

/// Studio configuration.
#[derive(Debug, Clone)]
pub struct LabConfig {
    /// Endpoint, model and retry configuration.
    pub generation: GenerationConfig,
    /// Where artifacts are written.
    pub out_dir: PathBuf,
    /// Whether the console prints raw JSON updates.
    pub events_json: bool,
}

impl LabConfig {
    /// Configuration with default endpoints for `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            generation: GenerationConfig::new(api_key),
            out_dir: PathBuf::from("design-lab-output"),
            events_json: false,
        }
    }
}

impl From<CliArgs> for LabConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            generation: GenerationConfig {
                api_key: args.api_key,
                api_base: args.api_base,
                text_model: args.text_model,
                image_model: args.image_model,
                speech_model: args.speech_model,
                voice: args.voice,
                retry: RetryConfig::new(args.max_retries, args.backoff_ms),
                request_timeout: args.request_timeout_secs.map(Duration::from_secs),
            },
            out_dir: args.out_dir,
            events_json: args.events_json,
        }
    }
}
