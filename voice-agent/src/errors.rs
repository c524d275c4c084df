use ai_llm_service::AiLlmError;
use speech_service::SpeechError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    /// Audio was processed but contained no recognizable speech.
    #[error("could not transcribe audio")]
    NoSpeech,

    #[error("speech service error: {0}")]
    Speech(#[from] SpeechError),

    #[error("chat error: {0}")]
    Chat(#[from] AiLlmError),

    /// Recording or playback command failed.
    #[error("audio device error: {0}")]
    Device(String),
}
