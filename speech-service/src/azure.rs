//! Azure Speech REST client.
//!
//! - Recognition: `POST {stt_url}?language=..&format=simple` with a 16 kHz PCM WAV body,
//!   response `{ "RecognitionStatus": "...", "DisplayText": "..." }`.
//! - Synthesis: `POST {tts_url}` with an SSML body, answered with
//!   `riff-24khz-16bit-mono-pcm` audio.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::SpeechConfig;
use crate::errors::{SpeechError, make_snippet};
use crate::{SpeechToText, TextToSpeech};

const SUBSCRIPTION_HEADER: &str = "ocp-apim-subscription-key";
const OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

#[derive(Debug)]
pub struct AzureSpeechClient {
    client: reqwest::Client,
    cfg: SpeechConfig,
}

impl AzureSpeechClient {
    pub fn new(cfg: SpeechConfig) -> Result<Self, SpeechError> {
        for (var, url) in [
            ("SPEECH_STT_ENDPOINT", &cfg.stt_url),
            ("SPEECH_TTS_ENDPOINT", &cfg.tts_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SpeechError::InvalidConfig {
                    var,
                    reason: "must start with http:// or https://",
                });
            }
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::HeaderName::from_static(SUBSCRIPTION_HEADER),
            header::HeaderValue::from_str(&cfg.key).map_err(|_| SpeechError::InvalidConfig {
                var: "SPEECH_KEY",
                reason: "not a valid header value",
            })?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        info!(
            stt_url = %cfg.stt_url,
            tts_url = %cfg.tts_url,
            voice = %cfg.voice,
            "AzureSpeechClient initialized"
        );

        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.cfg
    }

    fn ssml(&self, text: &str) -> String {
        format!(
            "<speak version='1.0' xml:lang='{lang}'><voice xml:lang='{lang}' name='{voice}'>{body}</voice></speak>",
            lang = self.cfg.language,
            voice = self.cfg.voice,
            body = escape_xml(text),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: Option<String>,
}

#[async_trait]
impl SpeechToText for AzureSpeechClient {
    async fn transcribe(&self, wav: &[u8]) -> Result<Option<String>, SpeechError> {
        let started = Instant::now();
        debug!(bytes = wav.len(), "POST {}", self.cfg.stt_url);

        let resp = self
            .client
            .post(&self.cfg.stt_url)
            .query(&[("language", self.cfg.language.as_str()), ("format", "simple")])
            .header(
                header::CONTENT_TYPE,
                "audio/wav; codecs=audio/pcm; samplerate=16000",
            )
            .header(header::ACCEPT, "application/json")
            .body(wav.to_vec())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            error!(%status, %snippet, latency_ms = started.elapsed().as_millis(), "speech recognition failed");
            return Err(SpeechError::HttpStatus {
                status,
                url: self.cfg.stt_url.clone(),
                snippet,
            });
        }

        let out: RecognitionResponse = resp
            .json()
            .await
            .map_err(|e| SpeechError::Decode(format!("recognition response: {e}")))?;

        let latency_ms = started.elapsed().as_millis();
        match out.recognition_status.as_str() {
            "Success" => {
                let text = out.display_text.unwrap_or_default().trim().to_string();
                info!(latency_ms, chars = text.len(), "speech recognized");
                Ok(Some(text).filter(|t| !t.is_empty()))
            }
            "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => {
                warn!(latency_ms, status = %out.recognition_status, "no speech recognized");
                Ok(None)
            }
            other => Err(SpeechError::Recognition(other.to_string())),
        }
    }
}

#[async_trait]
impl TextToSpeech for AzureSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let started = Instant::now();
        debug!(chars = text.len(), "POST {}", self.cfg.tts_url);

        let resp = self
            .client
            .post(&self.cfg.tts_url)
            .header(header::CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header(header::USER_AGENT, "studymate-backend")
            .body(self.ssml(text))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            error!(%status, %snippet, latency_ms = started.elapsed().as_millis(), "speech synthesis failed");
            return Err(SpeechError::HttpStatus {
                status,
                url: self.cfg.tts_url.clone(),
                snippet,
            });
        }

        let audio = resp.bytes().await?.to_vec();
        info!(
            latency_ms = started.elapsed().as_millis(),
            bytes = audio.len(),
            "speech synthesized"
        );
        Ok(audio)
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AzureSpeechClient {
        let mut cfg = SpeechConfig::for_region("key-1", "westeurope");
        cfg.stt_url = format!("{}/stt", server.uri());
        cfg.tts_url = format!("{}/tts", server.uri());
        cfg.timeout_secs = 5;
        AzureSpeechClient::new(cfg).unwrap()
    }

    #[tokio::test]
    async fn transcribe_returns_display_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stt"))
            .and(query_param("language", "en-US"))
            .and(header("Ocp-Apim-Subscription-Key", "key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "RecognitionStatus": "Success",
                "DisplayText": "What is photosynthesis?"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).transcribe(b"RIFF....WAVE").await.unwrap();
        assert_eq!(text.as_deref(), Some("What is photosynthesis?"));
    }

    #[tokio::test]
    async fn no_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "RecognitionStatus": "NoMatch" })),
            )
            .mount(&server)
            .await;

        assert_eq!(client(&server).transcribe(b"x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn synthesize_posts_escaped_ssml() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tts"))
            .and(header("X-Microsoft-OutputFormat", OUTPUT_FORMAT))
            .and(body_string_contains("name='en-US-JennyNeural'"))
            .and(body_string_contains("Tom &amp; Jerry &lt;3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFaudio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client(&server).synthesize("Tom & Jerry <3").await.unwrap();
        assert_eq!(audio, b"RIFFaudio");
    }

    #[tokio::test]
    async fn upstream_failure_is_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .mount(&server)
            .await;

        let err = client(&server).synthesize("hello").await.unwrap_err();
        assert!(matches!(err, SpeechError::HttpStatus { status, .. } if status.as_u16() == 401));
    }

    #[tokio::test]
    async fn empty_text_is_not_sent() {
        let server = MockServer::start().await;
        let err = client(&server).synthesize("   ").await.unwrap_err();
        assert!(matches!(err, SpeechError::EmptyText));
    }
}
