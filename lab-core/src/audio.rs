//! WAV packaging for synthesized speech.
//!
//! The speech endpoint returns bare 16-bit little-endian mono PCM. Players
//! need a RIFF/WAVE container around it, which is a fixed 44-byte header.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Sample rate of the speech endpoint's PCM output.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Size of the canonical WAV header.
pub const WAV_HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

/// Wrap raw PCM16 mono samples in a WAV container.
#[must_use]
pub fn pcm16_to_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);
    let byte_rate = sample_rate.saturating_mul(u32::from(BLOCK_ALIGN));

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}

/// A synthesized speech clip.
#[derive(Clone, PartialEq, Eq)]
pub struct SpeechClip {
    /// 16-bit little-endian mono samples.
    pub pcm: Vec<u8>,
    /// Samples per second.
    pub sample_rate: u32,
}

impl SpeechClip {
    /// Decode a base64 PCM payload recorded at `sample_rate`.
    ///
    /// # Errors
    ///
    /// Returns the base64 decode error when the payload is malformed.
    pub fn from_base64(encoded: &str, sample_rate: u32) -> Result<Self, base64::DecodeError> {
        let pcm = STANDARD.decode(encoded.trim())?;
        Ok(Self { pcm, sample_rate })
    }

    /// The clip as a playable WAV file.
    #[must_use]
    pub fn to_wav(&self) -> Vec<u8> {
        pcm16_to_wav(&self.pcm, self.sample_rate)
    }

    /// Playback length in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        let samples = self.pcm.len() as u64 / u64::from(BLOCK_ALIGN);
        samples * 1000 / u64::from(self.sample_rate)
    }
}

impl std::fmt::Debug for SpeechClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechClip")
            .field("bytes", &self.pcm.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}
