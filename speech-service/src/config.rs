//! Speech settings from the environment.
//!
//! - `SPEECH_KEY`          subscription key (required)
//! - `SPEECH_REGION`       Azure region, e.g. `westeurope` (required unless both endpoints are set)
//! - `SPEECH_LANGUAGE`     recognition language (default `en-US`)
//! - `SPEECH_VOICE`        synthesis voice (default `en-US-JennyNeural`)
//! - `SPEECH_STT_ENDPOINT` full recognition URL override
//! - `SPEECH_TTS_ENDPOINT` full synthesis URL override
//! - `SPEECH_TIMEOUT_SECS` request timeout (default 30)

use crate::errors::SpeechError;

pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_VOICE: &str = "en-US-JennyNeural";

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    pub key: String,
    pub language: String,
    pub voice: String,
    pub stt_url: String,
    pub tts_url: String,
    pub timeout_secs: u64,
}

impl SpeechConfig {
    /// Standard regional endpoints.
    pub fn for_region(key: impl Into<String>, region: &str) -> Self {
        Self {
            key: key.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            stt_url: format!(
                "https://{region}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1"
            ),
            tts_url: format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"),
            timeout_secs: 30,
        }
    }

    /// Reads the environment.
    ///
    /// # Errors
    /// [`SpeechError::MissingConfig`] when `SPEECH_KEY` is unset, or when no
    /// region is given and an endpoint override is missing.
    pub fn from_env() -> Result<Self, SpeechError> {
        let key = env("SPEECH_KEY").ok_or(SpeechError::MissingConfig("SPEECH_KEY"))?;

        let stt_override = env("SPEECH_STT_ENDPOINT");
        let tts_override = env("SPEECH_TTS_ENDPOINT");

        let mut cfg = match env("SPEECH_REGION") {
            Some(region) => Self::for_region(key, region.trim()),
            None if stt_override.is_some() && tts_override.is_some() => Self {
                key,
                language: DEFAULT_LANGUAGE.to_string(),
                voice: DEFAULT_VOICE.to_string(),
                stt_url: String::new(),
                tts_url: String::new(),
                timeout_secs: 30,
            },
            None => return Err(SpeechError::MissingConfig("SPEECH_REGION")),
        };

        if let Some(url) = stt_override {
            cfg.stt_url = url;
        }
        if let Some(url) = tts_override {
            cfg.tts_url = url;
        }
        if let Some(lang) = env("SPEECH_LANGUAGE") {
            cfg.language = lang;
        }
        if let Some(voice) = env("SPEECH_VOICE") {
            cfg.voice = voice;
        }
        if let Some(raw) = env("SPEECH_TIMEOUT_SECS") {
            cfg.timeout_secs = raw.trim().parse().map_err(|_| SpeechError::InvalidConfig {
                var: "SPEECH_TIMEOUT_SECS",
                reason: "expected u64",
            })?;
        }
        Ok(cfg)
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_urls() {
        let cfg = SpeechConfig::for_region("k", "westeurope");
        assert_eq!(
            cfg.stt_url,
            "https://westeurope.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1"
        );
        assert_eq!(
            cfg.tts_url,
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1"
        );
        assert_eq!(cfg.voice, "en-US-JennyNeural");
    }
}
