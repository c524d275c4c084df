//! Speech-to-text and text-to-speech over the Azure Speech REST API.
//!
//! The [`SpeechToText`] / [`TextToSpeech`] traits are the seam used by the
//! voice pipeline; [`azure::AzureSpeechClient`] implements both.

use async_trait::async_trait;

pub mod azure;
pub mod config;
pub mod errors;
pub mod wav;

pub use azure::AzureSpeechClient;
pub use config::SpeechConfig;
pub use errors::SpeechError;

/// Transcribes one utterance.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// `Ok(None)` means the audio was processed but no speech was recognized.
    async fn transcribe(&self, wav: &[u8]) -> Result<Option<String>, SpeechError>;
}

/// Synthesizes speech for a reply.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Returns a complete WAV (RIFF) file.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}
