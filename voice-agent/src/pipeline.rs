//! STT -> chat -> TTS for one utterance at a time.

use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::LlmServiceProfiles;
use speech_service::{SpeechToText, TextToSpeech, wav::ensure_wav};
use tracing::{info, warn};

use crate::conversation::Conversation;
use crate::errors::VoiceError;

#[derive(Clone)]
pub struct VoicePipeline {
    stt: Arc<dyn SpeechToText>,
    tts: Arc<dyn TextToSpeech>,
    llm: Arc<LlmServiceProfiles>,
}

impl VoicePipeline {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        tts: Arc<dyn TextToSpeech>,
        llm: Arc<LlmServiceProfiles>,
    ) -> Self {
        Self { stt, tts, llm }
    }

    /// Accepts a WAV file or raw PCM16 mono 16 kHz.
    ///
    /// # Errors
    /// [`VoiceError::NoSpeech`] when nothing was recognized.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String, VoiceError> {
        let wav = ensure_wav(audio)?;
        match self.stt.transcribe(&wav).await? {
            Some(text) => Ok(text),
            None => {
                warn!(bytes = wav.len(), "utterance had no recognizable speech");
                Err(VoiceError::NoSpeech)
            }
        }
    }

    /// Appends `user_text` and, on success, the model reply to `conversation`.
    ///
    /// On failure the user turn stays in the history and the error is returned;
    /// the caller decides what to say instead.
    pub async fn reply(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> Result<String, VoiceError> {
        let started = Instant::now();
        conversation.push_user(user_text);
        let reply = self
            .llm
            .chat_conversation(conversation.turns())
            .await?
            .trim()
            .to_string();
        conversation.push_assistant(reply.clone());
        info!(
            turns = conversation.turns().len(),
            latency_ms = started.elapsed().as_millis(),
            "conversation reply generated"
        );
        Ok(reply)
    }

    /// Returns WAV audio for `text`.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        Ok(self.tts.synthesize(text).await?)
    }
}
