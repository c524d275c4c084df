//! Conversation history for one session.

use ai_llm_service::{ChatRole, ChatTurn};

/// Background given to the conversation model unless `VOICE_SYSTEM_PROMPT` overrides it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are speaking with a user who has provided the following background:
- The user is a Computer Science student interested in AI, hackathons, and productivity.
- They have specific questions about real-time conversational AI and application design.
- The user's focus is on interactive, real-time applications, and they are familiar with Python and cloud computing.
Keep these details in mind as you respond.";

/// Spoken instead of a reply when the chat model fails.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that.";

/// `VOICE_SYSTEM_PROMPT`, or [`DEFAULT_SYSTEM_PROMPT`].
pub fn system_prompt_from_env() -> String {
    std::env::var("VOICE_SYSTEM_PROMPT")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

/// Insertion-ordered turns; the first one is always the system prompt.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::system(system_prompt)],
        }
    }

    /// Seeded with [`system_prompt_from_env`].
    pub fn from_env() -> Self {
        Self::new(system_prompt_from_env())
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(text));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Turns after the system prompt.
    pub fn exchanges(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.role != ChatRole::System)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_insertion_order() {
        let mut c = Conversation::new("be brief");
        c.push_user("hi");
        c.push_assistant("hello");
        c.push_user("bye");

        let roles: Vec<_> = c.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(c.turns()[0].content, "be brief");
        assert_eq!(c.exchanges(), 3);
    }
}
