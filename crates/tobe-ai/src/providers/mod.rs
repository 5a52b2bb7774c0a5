//! Provider ports and implementations

pub mod openai;

use crate::{Completion, Error, ImageRequest, ImageResponse, Message, Result, Summary};
use async_trait::async_trait;

/// Chat completion over an ordered list of messages
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete the conversation, returning the reply and the reported usage
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<Completion>;
}

/// One-shot text summarization
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn summarize(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<Summary>;
}

/// Image generation from a text prompt
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn create_image(&self, request: &ImageRequest) -> Result<ImageResponse>;
}

/// Get an API key from the provided value or the first non-empty environment
/// variable. Empty values count as missing.
pub fn get_api_key(provided: Option<&str>, env_vars: &[&str]) -> Result<String> {
    if let Some(key) = provided.filter(|key| !key.is_empty()) {
        return Ok(key.to_string());
    }

    env_vars
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|key| !key.is_empty()))
        .ok_or(Error::InvalidApiKey)
}
