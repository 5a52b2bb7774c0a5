//! Console-side ports the session loop talks to.

use tobe_ai::Message;

use crate::{error::Result, events::SessionEvent};

/// Source of user turns
pub trait InputPort {
    /// Read one user input. `Ok(None)` ends the session.
    fn read_user_input(&mut self, prompt_label: &str) -> Result<Option<String>>;
}

/// Sink for the rendered conversation
pub trait OutputPort {
    /// Display the conversation after a turn
    fn render(&mut self, history: &[Message], used_tokens: u64);

    /// Progress notifications; ignored by default
    fn on_event(&mut self, _event: &SessionEvent) {}
}
