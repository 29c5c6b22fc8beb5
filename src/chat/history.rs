//! Bounded conversation history.

use std::collections::VecDeque;

use crate::types::ModelMessage;

/// Conversation history with a pinned system record and a sliding tail.
///
/// `len()` never exceeds `limit`; once full, the oldest non-system record is
/// dropped on every append.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    system: ModelMessage,
    tail: VecDeque<ModelMessage>,
    limit: usize,
}

impl ConversationHistory {
    /// Start a history holding only the system prompt. `limit` counts the system record.
    pub fn new(system_prompt: impl Into<String>, limit: usize) -> Self {
        let limit = limit.max(2);
        Self {
            system: ModelMessage::system(system_prompt),
            tail: VecDeque::with_capacity(limit - 1),
            limit,
        }
    }

    /// Append a user record, keeping at most `max_chars` characters of `text`.
    pub fn push_user(&mut self, text: &str, max_chars: usize) {
        let text = truncate_chars(text, max_chars);
        self.push(ModelMessage::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(ModelMessage::assistant(text));
    }

    fn push(&mut self, message: ModelMessage) {
        while self.tail.len() + 1 >= self.limit {
            self.tail.pop_front();
        }
        self.tail.push_back(message);
    }

    pub fn len(&self) -> usize {
        self.tail.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn system(&self) -> &ModelMessage {
        &self.system
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelMessage> {
        std::iter::once(&self.system).chain(self.tail.iter())
    }

    /// Owned snapshot, system record first.
    pub fn to_messages(&self) -> Vec<ModelMessage> {
        self.iter().cloned().collect()
    }
}

/// Prefix of `text` holding at most `max_chars` Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_with_system_only() {
        let history = ConversationHistory::new("sys", 40);
        assert_eq!(history.len(), 1);
        assert_eq!(history.system().role, Role::System);
        assert_eq!(history.system().text(), "sys");
    }

    #[test]
    fn compaction_keeps_system_and_most_recent() {
        let mut history = ConversationHistory::new("sys", 40);
        for i in 0..100 {
            history.push_user(&format!("u{i}"), 100);
            assert!(history.len() <= 40);
        }
        assert_eq!(history.len(), 40);

        let messages = history.to_messages();
        assert_eq!(messages[0].text(), "sys");
        let tail: Vec<String> = messages[1..].iter().map(|m| m.text()).collect();
        let expected: Vec<String> = (61..100).map(|i| format!("u{i}")).collect();
        assert_eq!(tail, expected);
    }

    #[test]
    fn assistant_appends_are_bounded_too() {
        let mut history = ConversationHistory::new("sys", 3);
        history.push_user("a", 10);
        history.push_assistant("b");
        history.push_user("c", 10);
        let texts: Vec<String> = history.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["sys", "b", "c"]);
    }

    #[test]
    fn truncates_by_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");

        let mut history = ConversationHistory::new("sys", 40);
        let long = "ü".repeat(175_010);
        history.push_user(&long, 175_000);
        let stored = history.to_messages()[1].text();
        assert_eq!(stored.chars().count(), 175_000);
    }
}
