//! Text, image and speech generation over the Gemini API.
//!
//! Each call builds a provider-specific JSON body, sends it through the
//! [`RetryingClient`], and digs one field out of the response. A response
//! without that field is an error, never an empty success (speech is the
//! exception: no audio means nothing to play).

use std::fmt;
use std::time::Duration;

use lab_core::prompt::{image_prompt, speech_prompt, SYSTEM_INSTRUCTION};
use lab_core::{ImageData, SpeechClip, SPEECH_SAMPLE_RATE};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{GenerationError, GenerationResult};
use crate::retry::{RetryConfig, RetryingClient};

/// Default API base for the Generative Language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default text model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
/// Default speech model.
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
/// Default prebuilt voice.
pub const DEFAULT_VOICE: &str = "Zephyr";

/// Largest batch the image endpoint is asked for.
pub const MAX_IMAGES_PER_REQUEST: u32 = 4;

/// Clamp a requested image count into `1..=4`.
#[must_use]
pub fn clamp_image_count(count: u32) -> u32 {
    count.clamp(1, MAX_IMAGES_PER_REQUEST)
}

/// Placeholder printed instead of secrets.
pub const REDACTED: &str = "<redacted>";

/// Endpoint and model configuration.
#[derive(Clone)]
pub struct GenerationConfig {
    /// API key, sent as the `key` query parameter.
    pub api_key: String,
    /// API base URL (everything before `/models/...`).
    pub api_base: String,
    /// Model for text generation.
    pub text_model: String,
    /// Model for image generation.
    pub image_model: String,
    /// Model for speech synthesis.
    pub speech_model: String,
    /// Prebuilt voice for speech synthesis.
    pub voice: String,
    /// Retry policy shared by every call.
    pub retry: RetryConfig,
    /// Optional per-attempt timeout.
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &REDACTED)
            .field("api_base", &self.api_base)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("voice", &self.voice)
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GenerationConfig {
    /// Configuration with default endpoints and models for `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            retry: RetryConfig::default(),
            request_timeout: None,
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// The three generation operations.
#[derive(Clone)]
pub struct GenerationService {
    client: RetryingClient,
    text_url: Url,
    image_url: Url,
    speech_url: Url,
    voice: String,
}

impl fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationService")
            .field("text_url", &self.text_url.path())
            .field("image_url", &self.image_url.path())
            .field("speech_url", &self.speech_url.path())
            .field("voice", &self.voice)
            .field("retry", self.client.retry_config())
            .finish_non_exhaustive()
    }
}

impl GenerationService {
    /// Create the service and resolve every endpoint up front.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidUrl`] if the API base is malformed.
    /// Returns [`GenerationError::Http`] if the HTTP client fails to build.
    pub fn new(config: GenerationConfig) -> GenerationResult<Self> {
        let client = RetryingClient::new(config.retry.clone(), config.request_timeout)?;
        Self::with_client(config, client)
    }

    /// Create the service around an existing retrying client.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidUrl`] if the API base is malformed.
    pub fn with_client(config: GenerationConfig, client: RetryingClient) -> GenerationResult<Self> {
        let base = config.api_base.trim_end_matches('/');
        let endpoint = |model: &str, method: &str| -> GenerationResult<Url> {
            let mut url = Url::parse(&format!("{base}/models/{model}:{method}"))
                .map_err(|e| GenerationError::InvalidUrl(format!("{base}: {e}")))?;
            url.query_pairs_mut().append_pair("key", &config.api_key);
            Ok(url)
        };

        Ok(Self {
            text_url: endpoint(&config.text_model, "generateContent")?,
            image_url: endpoint(&config.image_model, "predict")?,
            speech_url: endpoint(&config.speech_model, "generateContent")?,
            voice: config.voice.clone(),
            client,
        })
    }

    /// Generate a design description.
    ///
    /// `history` (a list of `contents` turns) replaces the single-turn prompt
    /// when non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::RequestFailed`] when retries run out and
    /// [`GenerationError::EmptyResponse`] when no text came back.
    pub async fn generate_text(&self, prompt: &str, history: &[Value]) -> GenerationResult<String> {
        let contents = if history.is_empty() {
            json!([{ "parts": [{ "text": prompt }] }])
        } else {
            Value::Array(history.to_vec())
        };
        let body = json!({
            "contents": contents,
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        });

        let response = self.client.request(&self.text_url, &body).await?;
        let text = response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyResponse("text"))?;

        info!(chars = text.len(), "Generated text");
        Ok(text.to_string())
    }

    /// Manifest up to four concept images for `concept`.
    ///
    /// `iteration` is embedded in the prompt; the caller owns the counter.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NoImagesReturned`] when the response has no
    /// predictions or none carries decodable image bytes.
    pub async fn generate_images(
        &self,
        concept: &str,
        count: u32,
        iteration: u64,
    ) -> GenerationResult<Vec<ImageData>> {
        let sample_count = clamp_image_count(count);
        let body = json!({
            "instances": [{ "prompt": image_prompt(concept, iteration) }],
            "parameters": { "sampleCount": sample_count },
        });

        let response = self.client.request(&self.image_url, &body).await?;
        let predictions = response
            .get("predictions")
            .and_then(Value::as_array)
            .filter(|predictions| !predictions.is_empty())
            .ok_or(GenerationError::NoImagesReturned)?;

        let images: Vec<ImageData> = predictions
            .iter()
            .filter_map(|prediction| prediction.get("bytesBase64Encoded")?.as_str())
            .filter_map(|encoded| match ImageData::from_base64(encoded) {
                Ok(image) => Some(image),
                Err(e) => {
                    warn!("Dropping prediction with undecodable image bytes: {e}");
                    None
                }
            })
            .collect();

        if images.is_empty() {
            return Err(GenerationError::NoImagesReturned);
        }
        debug!(
            requested = sample_count,
            predictions = predictions.len(),
            kept = images.len(),
            iteration,
            "Manifested images"
        );
        Ok(images)
    }

    /// Synthesize narration for `text`.
    ///
    /// Returns `Ok(None)` when the response carries no audio.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::RequestFailed`] when retries run out.
    pub async fn synthesize_speech(&self, text: &str) -> GenerationResult<Option<SpeechClip>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": speech_prompt(text) }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": self.voice } }
                }
            },
        });

        let response = self.client.request(&self.speech_url, &body).await?;
        let Some(encoded) = response
            .pointer("/candidates/0/content/parts/0/inlineData/data")
            .and_then(Value::as_str)
        else {
            debug!("Speech response carried no audio");
            return Ok(None);
        };

        match SpeechClip::from_base64(encoded, SPEECH_SAMPLE_RATE) {
            Ok(clip) => Ok(Some(clip)),
            Err(e) => {
                warn!("Speech response audio is not valid base64: {e}");
                Ok(None)
            }
        }
    }
}
