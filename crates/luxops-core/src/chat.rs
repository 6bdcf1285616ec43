use chrono::{DateTime, Utc};

use crate::{next_message_id, ChatMessage, ChatRole};

/// Turns of context handed to the reply collaborator.
pub const HISTORY_TURNS: usize = 5;

pub const MANAGER_SENDER: &str = "Director";
pub const AI_SENDER: &str = "System AI";
pub const SYSTEM_SENDER: &str = "System";

/// Append-only communication log.
#[derive(Debug, Clone, Default)]
pub struct CommunicationLog {
    messages: Vec<ChatMessage>,
}

impl CommunicationLog {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(
        &mut self,
        sender: &str,
        role: ChatRole,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &ChatMessage {
        let id = next_message_id(&self.messages);
        self.messages.push(ChatMessage {
            id,
            sender: sender.to_string(),
            role,
            text: text.into(),
            timestamp: now,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Last `turns` messages as "Role: text" lines, oldest first.
    pub fn history(&self, turns: usize) -> Vec<String> {
        let start = self.messages.len().saturating_sub(turns);
        self.messages[start..]
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_last_turns() {
        let now = Utc::now();
        let mut log = CommunicationLog::default();
        for i in 0..7 {
            log.push(MANAGER_SENDER, ChatRole::Manager, format!("m{i}"), now);
        }
        log.push(AI_SENDER, ChatRole::Ai, "ok", now);
        let h = log.history(HISTORY_TURNS);
        assert_eq!(h.len(), 5);
        assert_eq!(h[0], "Manager: m3");
        assert_eq!(h[4], "AI: ok");
        assert_eq!(log.messages().last().map(|m| m.id.as_str()), Some("msg-8"));
    }

    #[test]
    fn short_history() {
        let mut log = CommunicationLog::default();
        assert!(log.history(HISTORY_TURNS).is_empty());
        log.push(SYSTEM_SENDER, ChatRole::Ai, "New event schematic generated.", Utc::now());
        assert_eq!(log.history(HISTORY_TURNS).len(), 1);
    }
}
