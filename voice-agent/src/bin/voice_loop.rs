//! Local voice loop: listen, transcribe, reply, speak. Runs until Ctrl+C.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use anyhow::{Context, Result};
use colored::Colorize;
use speech_service::{AzureSpeechClient, SpeechConfig};
use tracing::{error, warn};
use voice_agent::{
    AudioDevice, Conversation, FALLBACK_REPLY, VoiceError, VoiceLoopConfig, VoicePipeline,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    services::telemetry::init_tracing("info");

    let llm = Arc::new(LlmServiceProfiles::from_env().context("LLM configuration")?);
    let speech = Arc::new(
        AzureSpeechClient::new(SpeechConfig::from_env().context("speech configuration")?)
            .context("speech client")?,
    );
    let pipeline = VoicePipeline::new(speech.clone(), speech, llm);

    let cfg = VoiceLoopConfig::from_env();
    let device = AudioDevice::new(&cfg).context("audio device")?;
    let mut conversation = Conversation::from_env();

    println!("{}", "Voice loop started. Press Ctrl+C to stop.".green());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = iteration(&pipeline, &device, &mut conversation, cfg.async_playback) => {}
        }
    }

    println!("{}", "Bye.".green());
    Ok(())
}

/// One listen/respond cycle. Every failure is reported and the loop goes on.
async fn iteration(
    pipeline: &VoicePipeline,
    device: &AudioDevice,
    conversation: &mut Conversation,
    async_playback: bool,
) {
    println!("{}", "Listening...".cyan());
    let audio = match device.record().await {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "recording failed");
            eprintln!("{} {e}", "Microphone error:".red());
            return;
        }
    };

    println!("{}", "Processing...".cyan());
    let user_text = match pipeline.transcribe(audio).await {
        Ok(t) => t,
        Err(VoiceError::NoSpeech) => {
            println!("{}", "Could not understand audio, please speak again.".yellow());
            return;
        }
        Err(e) => {
            error!(error = %e, "transcription failed");
            eprintln!("{} {e}", "Could not transcribe audio:".red());
            return;
        }
    };
    println!("{} {user_text}", "You:".bold());

    let reply = match pipeline.reply(conversation, &user_text).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "chat failed, speaking apology");
            conversation.push_assistant(FALLBACK_REPLY);
            FALLBACK_REPLY.to_string()
        }
    };
    println!("{} {reply}", "AI:".bold());

    if async_playback {
        let (pipeline, device) = (pipeline.clone(), device.clone());
        tokio::spawn(async move { speak(&pipeline, &device, &reply).await });
    } else {
        speak(pipeline, device, &reply).await;
    }
}

async fn speak(pipeline: &VoicePipeline, device: &AudioDevice, text: &str) {
    let result = match pipeline.synthesize(text).await {
        Ok(wav) => device.play(&wav).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        error!(error = %e, "playback failed");
        eprintln!("{} {e}", "Could not play reply:".red());
    }
}
