//! GET /ws: voice conversation over a WebSocket.
//!
//! Each connection owns its conversation history; it is created on upgrade and
//! dropped when the socket closes. Utterances are handled one at a time.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, info, warn};
use voice_agent::{Conversation, FALLBACK_REPLY, VoicePipeline};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    routes::voice::ws_event::{ClientEvent, ServerEvent},
};

pub const TRANSCRIBE_FAILED: &str = "Could not transcribe audio.";
pub const SYNTHESIZE_FAILED: &str = "Could not synthesize speech.";
pub const INVALID_EVENT: &str = "Invalid event payload.";

/// Handler: GET /ws. Answers 503 before upgrading when speech is not configured.
pub async fn voice_ws(
    State(state): State<Arc<AppState>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(pipeline) = state.voice.clone() else {
        return AppError::voice_disabled().into_response();
    };
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };
    let conversation = Conversation::new(state.voice_system_prompt.clone());
    ws.on_upgrade(move |socket| handle_socket(socket, pipeline, conversation))
}

async fn handle_socket(mut socket: WebSocket, pipeline: VoicePipeline, mut conversation: Conversation) {
    info!("voice session opened");

    while let Some(msg) = socket.recv().await {
        let audio = match msg {
            Ok(Message::Text(text)) => match decode_event(text.as_str()) {
                Ok(audio) => audio,
                Err(reply) => {
                    if send(&mut socket, &reply).await.is_err() {
                        break;
                    }
                    continue;
                }
            },
            Ok(Message::Binary(bytes)) => bytes.to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "websocket receive failed");
                break;
            }
        };

        let reply = handle_audio(&pipeline, &mut conversation, audio).await;
        if send(&mut socket, &reply).await.is_err() {
            break;
        }
    }

    info!(turns = conversation.turns().len(), "voice session closed");
}

fn decode_event(text: &str) -> Result<Vec<u8>, ServerEvent> {
    let ClientEvent::UserAudio { audio } = serde_json::from_str::<ClientEvent>(text).map_err(|e| {
        warn!(error = %e, "unparseable websocket event");
        ServerEvent::error(INVALID_EVENT)
    })?;
    STANDARD.decode(audio.trim()).map_err(|e| {
        warn!(error = %e, "audio is not valid base64");
        ServerEvent::error(INVALID_EVENT)
    })
}

/// One utterance: transcribe, reply (apology on chat failure), synthesize.
pub async fn handle_audio(
    pipeline: &VoicePipeline,
    conversation: &mut Conversation,
    audio: Vec<u8>,
) -> ServerEvent {
    let user_text = match pipeline.transcribe(audio).await {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "transcription failed");
            return ServerEvent::error(TRANSCRIBE_FAILED);
        }
    };

    let reply = match pipeline.reply(conversation, &user_text).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "chat failed, answering with apology");
            conversation.push_assistant(FALLBACK_REPLY);
            FALLBACK_REPLY.to_string()
        }
    };

    match pipeline.synthesize(&reply).await {
        Ok(wav) => ServerEvent::AiAudio {
            audio: STANDARD.encode(wav),
        },
        Err(e) => {
            warn!(error = %e, "synthesis failed");
            ServerEvent::error(SYNTHESIZE_FAILED)
        }
    }
}

async fn send(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(event) {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "failed to encode websocket event");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmProvider, LlmServiceProfiles};
    use async_trait::async_trait;
    use serde_json::json;
    use speech_service::{SpeechError, SpeechToText, TextToSpeech};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedStt(Option<&'static str>);

    #[async_trait]
    impl SpeechToText for FixedStt {
        async fn transcribe(&self, _wav: &[u8]) -> Result<Option<String>, SpeechError> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct SpeakTts {
        fail: bool,
    }

    #[async_trait]
    impl TextToSpeech for SpeakTts {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
            if self.fail {
                return Err(SpeechError::Recognition("Canceled".into()));
            }
            Ok(text.as_bytes().to_vec())
        }
    }

    async fn chat_server(status: u16, content: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "choices": [ { "message": { "content": content } } ]
            })))
            .mount(&server)
            .await;
        server
    }

    fn pipeline(server: &MockServer, heard: Option<&'static str>, tts_fails: bool) -> VoicePipeline {
        let cfg = LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "talk".into(),
            endpoint: server.uri(),
            api_key: Some("k".into()),
            api_version: None,
            max_tokens: Some(150),
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        };
        let llm = Arc::new(LlmServiceProfiles::new(cfg.clone(), None, cfg, Some(1)).unwrap());
        VoicePipeline::new(
            Arc::new(FixedStt(heard)),
            Arc::new(SpeakTts { fail: tts_fails }),
            llm,
        )
    }

    fn pcm() -> Vec<u8> {
        vec![0u8; 640]
    }

    #[tokio::test]
    async fn utterance_becomes_ai_audio() {
        let server = chat_server(200, "Hello!").await;
        let p = pipeline(&server, Some("hi"), false);
        let mut conv = Conversation::new("sys");

        let ev = handle_audio(&p, &mut conv, pcm()).await;
        assert_eq!(
            ev,
            ServerEvent::AiAudio {
                audio: STANDARD.encode("Hello!")
            }
        );
        assert_eq!(conv.turns().len(), 3);
    }

    #[tokio::test]
    async fn silence_reports_transcription_error() {
        let server = chat_server(200, "unused").await;
        let p = pipeline(&server, None, false);
        let mut conv = Conversation::new("sys");

        let ev = handle_audio(&p, &mut conv, pcm()).await;
        assert_eq!(ev, ServerEvent::error(TRANSCRIBE_FAILED));
        assert_eq!(conv.turns().len(), 1);
    }

    #[tokio::test]
    async fn chat_failure_is_spoken_as_apology() {
        let server = chat_server(500, "").await;
        let p = pipeline(&server, Some("hi"), false);
        let mut conv = Conversation::new("sys");

        let ev = handle_audio(&p, &mut conv, pcm()).await;
        assert_eq!(
            ev,
            ServerEvent::AiAudio {
                audio: STANDARD.encode(FALLBACK_REPLY)
            }
        );
        assert_eq!(conv.turns()[2].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn synthesis_failure_reports_error() {
        let server = chat_server(200, "Hello!").await;
        let p = pipeline(&server, Some("hi"), true);
        let mut conv = Conversation::new("sys");
        assert_eq!(
            handle_audio(&p, &mut conv, pcm()).await,
            ServerEvent::error(SYNTHESIZE_FAILED)
        );
    }

    #[test]
    fn bad_frames_are_rejected() {
        assert!(decode_event("not json").is_err());
        assert!(decode_event(r#"{"event":"user_audio","audio":"%%%"}"#).is_err());
        assert_eq!(
            decode_event(r#"{"event":"user_audio","audio":"UklGRg=="}"#).unwrap(),
            b"RIFF"
        );
    }
}
