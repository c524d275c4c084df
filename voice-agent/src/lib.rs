//! Voice conversation on top of the speech and LLM services.
//!
//! - [`conversation::Conversation`]: ordered turns seeded with a system prompt,
//!   owned by one session.
//! - [`pipeline::VoicePipeline`]: transcribe, reply, synthesize. Each step is
//!   exposed separately so callers can report failures per step.
//! - [`device`]: record/play through external commands for the local loop.

pub mod conversation;
pub mod device;
pub mod errors;
pub mod pipeline;

pub use conversation::{
    Conversation, DEFAULT_SYSTEM_PROMPT, FALLBACK_REPLY, system_prompt_from_env,
};
pub use device::{AudioDevice, VoiceLoopConfig};
pub use errors::VoiceError;
pub use pipeline::VoicePipeline;
