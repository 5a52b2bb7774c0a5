//! tobe-ai: provider layer for chat completion, summarization and images
//!
//! This crate defines the wire types shared with the session core, the
//! provider traits the core is written against, and an OpenAI implementation.

pub mod error;
pub mod providers;
pub mod types;

pub use error::{Error, Result};
pub use providers::{CompletionProvider, ImageProvider, SummaryProvider};
pub use types::*;
