//! tobe-session: conversation session with a token budget
//!
//! This crate keeps the conversation state for one chat session, accounts for
//! the tokens the provider reports, and compacts the conversation into a
//! summary once the budget is spent.

pub mod budget;
pub mod compaction;
pub mod conversation;
pub mod error;
pub mod events;
pub mod ports;
pub mod session;

pub use budget::TokenBudget;
pub use compaction::{
    CompactionConfig, CompactionOutcome, CompactionProtocol, CompactionReason, CompactionRequest,
    CompactionState, UsageAfterCompaction,
};
pub use conversation::ConversationState;
pub use error::{Error, Result};
pub use events::SessionEvent;
pub use ports::{InputPort, OutputPort};
pub use session::{SessionConfig, SessionController, TurnOutcome};
