//! Core types for provider interactions

use serde::{Deserialize, Serialize};

/// Message roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalized name for display
    pub fn title(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single conversation turn.
///
/// Messages are immutable once built: fields are private and only readable
/// through accessors. The serialized form is the chat wire format
/// `{"role": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Create a message with an explicit role
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Token usage as reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Result of a chat completion call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Reply text of the first choice
    pub text: String,
    /// Usage reported for the whole request
    pub usage: Usage,
}

/// Result of a summarization call
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub text: String,
}

/// Output sizes accepted by the image endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Small,
    #[serde(rename = "512x512")]
    #[default]
    Medium,
    #[serde(rename = "1024x1024")]
    Large,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Small => "256x256",
            ImageSize::Medium => "512x512",
            ImageSize::Large => "1024x1024",
        }
    }

    /// Parse a `WIDTHxHEIGHT` string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "256x256" => Some(ImageSize::Small),
            "512x512" => Some(ImageSize::Medium),
            "1024x1024" => Some(ImageSize::Large),
            _ => None,
        }
    }
}

/// Image generation request
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub n: u32,
    pub size: ImageSize,
}

impl ImageRequest {
    /// A single image of the given size
    pub fn new(prompt: impl Into<String>, size: ImageSize) -> Self {
        Self {
            prompt: prompt.into(),
            n: 1,
            size,
        }
    }
}

/// One generated image
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
}

/// Image generation response
#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    /// Unix timestamp (seconds)
    pub created: i64,
    #[serde(default)]
    pub data: Vec<ImageData>,
}

impl ImageResponse {
    /// URL of the first generated image
    pub fn url(&self) -> Option<&str> {
        self.data.first().and_then(|d| d.url.as_deref())
    }

    /// Format the creation timestamp for display
    pub fn created_at_display(&self) -> String {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_opt(self.created, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_format() {
        let msg = Message::user("hola");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hola"}));
    }

    #[test]
    fn test_message_from_wire() {
        let msg: Message =
            serde_json::from_str(r#"{"role": "system", "content": "be formal"}"#).unwrap();
        assert_eq!(msg.role(), Role::System);
        assert_eq!(msg.content(), "be formal");
    }

    #[test]
    fn test_empty_content_allowed() {
        let msg = Message::assistant("");
        assert_eq!(msg.role(), Role::Assistant);
        assert!(msg.content().is_empty());
    }

    #[test]
    fn test_role_title() {
        assert_eq!(Role::User.title(), "User");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_image_size_parse() {
        assert_eq!(ImageSize::parse("1024x1024"), Some(ImageSize::Large));
        assert_eq!(ImageSize::parse("300x300"), None);
        assert_eq!(ImageSize::default().as_str(), "512x512");
    }

    #[test]
    fn test_image_request_serializes_size() {
        let req = ImageRequest::new("a house by the sea", ImageSize::Medium);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["size"], "512x512");
        assert_eq!(json["n"], 1);
    }

    #[test]
    fn test_image_response_url() {
        let resp: ImageResponse = serde_json::from_str(
            r#"{"created": 1680000000, "data": [{"url": "https://img.example/1.png"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.url(), Some("https://img.example/1.png"));
        assert_eq!(resp.created_at_display(), "2023-03-28 10:40");
    }

    #[test]
    fn test_image_response_empty_data() {
        let resp: ImageResponse = serde_json::from_str(r#"{"created": 0}"#).unwrap();
        assert!(resp.url().is_none());
    }
}
