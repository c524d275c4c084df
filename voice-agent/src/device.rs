//! Microphone and speaker through external commands.
//!
//! The record command must write one WAV utterance to stdout and exit; the
//! play command reads a WAV from stdin. Commands are split on whitespace, no
//! shell quoting.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::VoiceError;

pub const DEFAULT_RECORD_CMD: &str = "arecord -q -f S16_LE -r 16000 -c 1 -d 5 -t wav -";
pub const DEFAULT_PLAY_CMD: &str = "aplay -q -";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceLoopConfig {
    pub record_cmd: String,
    pub play_cmd: String,
    /// Synthesize and play on a spawned task so the next listen starts
    /// immediately. Playback may then overlap recording.
    pub async_playback: bool,
}

impl VoiceLoopConfig {
    /// `VOICE_RECORD_CMD`, `VOICE_PLAY_CMD`, `VOICE_ASYNC_PLAYBACK` (`true`/`1`).
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            record_cmd: var("VOICE_RECORD_CMD").unwrap_or_else(|| DEFAULT_RECORD_CMD.into()),
            play_cmd: var("VOICE_PLAY_CMD").unwrap_or_else(|| DEFAULT_PLAY_CMD.into()),
            async_playback: var("VOICE_ASYNC_PLAYBACK")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioDevice {
    record: Vec<String>,
    play: Vec<String>,
}

impl AudioDevice {
    pub fn new(cfg: &VoiceLoopConfig) -> Result<Self, VoiceError> {
        Ok(Self {
            record: split_command(&cfg.record_cmd)?,
            play: split_command(&cfg.play_cmd)?,
        })
    }

    /// Runs the record command and returns its stdout.
    pub async fn record(&self) -> Result<Vec<u8>, VoiceError> {
        let out = Command::new(&self.record[0])
            .args(&self.record[1..])
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| VoiceError::Device(format!("spawn {}: {e}", self.record[0])))?;

        if !out.status.success() {
            return Err(VoiceError::Device(format!(
                "{} exited with {}",
                self.record[0], out.status
            )));
        }
        debug!(bytes = out.stdout.len(), "utterance recorded");
        Ok(out.stdout)
    }

    /// Pipes `wav` into the play command and waits for it to finish.
    pub async fn play(&self, wav: &[u8]) -> Result<(), VoiceError> {
        let mut child = Command::new(&self.play[0])
            .args(&self.play[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| VoiceError::Device(format!("spawn {}: {e}", self.play[0])))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(wav)
                .await
                .map_err(|e| VoiceError::Device(format!("write audio: {e}")))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| VoiceError::Device(format!("wait {}: {e}", self.play[0])))?;
        if !status.success() {
            return Err(VoiceError::Device(format!(
                "{} exited with {status}",
                self.play[0]
            )));
        }
        Ok(())
    }
}

fn split_command(cmd: &str) -> Result<Vec<String>, VoiceError> {
    let parts: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        return Err(VoiceError::Device("empty audio command".into()));
    }
    Ok(parts)
}
