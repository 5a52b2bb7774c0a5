//! Conversation state: the window sent to the model and the full history.

use tobe_ai::Message;

/// Two views of one conversation.
///
/// `current` is what the next completion call sees. It opens with the
/// priming messages, or with a single summary message once compacted.
/// `history` is the append-only log of real turns; the summary never
/// enters it.
#[derive(Debug, Clone)]
pub struct ConversationState {
    current: Vec<Message>,
    history: Vec<Message>,
}

impl ConversationState {
    /// Start a conversation with the given priming messages
    pub fn new(priming: Vec<Message>) -> Self {
        Self {
            current: priming,
            history: Vec::new(),
        }
    }

    /// Start a conversation primed with a system prompt and its acknowledgement
    pub fn primed(system_prompt: &str, reply: &str) -> Self {
        Self::new(vec![Message::system(system_prompt), Message::assistant(reply)])
    }

    /// Append a real turn to both views
    pub fn add(&mut self, message: Message) {
        self.history.push(message.clone());
        self.current.push(message);
    }

    pub fn current(&self) -> &[Message] {
        &self.current
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The messages to send on the next completion call
    pub fn wire_messages(&self) -> &[Message] {
        &self.current
    }

    /// The last `n` history messages (fewer if history is shorter)
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Replace the current view with `[summary] + last keep_recent messages`.
    ///
    /// History is left untouched.
    pub fn compact(&mut self, summary: Message, keep_recent: usize) {
        let mut current = Vec::with_capacity(1 + keep_recent);
        current.push(summary);
        current.extend_from_slice(self.recent(keep_recent));
        self.current = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tobe_ai::Role;

    fn primed() -> ConversationState {
        ConversationState::primed("be formal", "OK")
    }

    #[test]
    fn test_starts_with_priming_pair() {
        let state = primed();
        assert_eq!(state.current().len(), 2);
        assert_eq!(state.current()[0].role(), Role::System);
        assert_eq!(state.current()[1].role(), Role::Assistant);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_add_appends_to_both_views() {
        let mut state = primed();
        state.add(Message::user("hola"));
        state.add(Message::assistant("buenas"));

        assert_eq!(state.history().len(), 2);
        assert_eq!(state.current().len(), 4);
        assert_eq!(&state.current()[2..], state.history());
    }

    #[test]
    fn test_compact_keeps_last_two() {
        let mut state = primed();
        for i in 0..3 {
            state.add(Message::user(format!("q{}", i)));
            state.add(Message::assistant(format!("a{}", i)));
        }

        state.compact(Message::assistant("summary"), 2);

        let contents: Vec<&str> = state.current().iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["summary", "q2", "a2"]);
        assert_eq!(state.history().len(), 6);
    }

    #[test]
    fn test_compact_empty_history() {
        let mut state = primed();
        state.compact(Message::assistant("summary"), 2);
        assert_eq!(state.current(), &[Message::assistant("summary")]);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_compact_single_message_history() {
        let mut state = primed();
        state.add(Message::user("solo"));
        state.compact(Message::assistant("summary"), 2);
        assert_eq!(state.current().len(), 2);
        assert_eq!(state.current()[1].content(), "solo");
    }

    #[test]
    fn test_summary_not_in_history() {
        let mut state = primed();
        state.add(Message::user("q"));
        state.add(Message::assistant("a"));
        state.compact(Message::assistant("summary"), 2);
        state.add(Message::user("next"));

        assert!(state.history().iter().all(|m| m.content() != "summary"));
        assert_eq!(state.history().len(), 3);
        assert_eq!(state.current().len(), 4);
    }

    #[test]
    fn test_recent_saturates() {
        let mut state = primed();
        assert!(state.recent(2).is_empty());
        state.add(Message::user("a"));
        assert_eq!(state.recent(5).len(), 1);
    }
}
