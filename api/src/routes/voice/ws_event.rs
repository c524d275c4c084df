//! WebSocket event frames. Audio travels base64-encoded inside JSON text frames.

use serde::{Deserialize, Serialize};

/// Client → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// WAV or raw PCM16 mono 16 kHz.
    UserAudio { audio: String },
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    AiAudio { audio: String },
    Error { message: String },
}

impl ServerEvent {
    pub fn error(message: &str) -> Self {
        ServerEvent::Error {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_event_tag() {
        let ev: ClientEvent =
            serde_json::from_str(r#"{"event":"user_audio","audio":"UklGRg=="}"#).unwrap();
        assert!(matches!(ev, ClientEvent::UserAudio { audio } if audio == "UklGRg=="));

        let out = serde_json::to_value(ServerEvent::error("Could not transcribe audio.")).unwrap();
        assert_eq!(
            out,
            serde_json::json!({ "event": "error", "message": "Could not transcribe audio." })
        );
    }
}
