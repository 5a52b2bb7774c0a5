//! OpenAI API provider (chat completions, legacy completions, images)

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{CompletionProvider, ImageProvider, SummaryProvider, get_api_key};
use crate::{
    error::{Error, Result},
    types::{Completion, ImageRequest, ImageResponse, Message, Summary, Usage},
};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for one-shot summarization through the completions endpoint
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-3.5-turbo-instruct";

/// Environment variables checked for the API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["OPENAI_API_KEY", "OPEN_AI_TOKEN"];

/// OpenAI API client
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    summary_model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(get_api_key(None, API_KEY_ENV_VARS)?))
    }

    /// Point the client at a different API root (proxies, compatible servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different model for summarization
    pub fn with_summary_model(mut self, model: impl Into<String>) -> Self {
        self.summary_model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "openai request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "openai request failed");
            return Err(Error::from_status(status.as_u16(), &text, retry_after));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<Completion> {
        let request = ChatRequest { model, messages };
        let response: ChatResponse = self.post("chat/completions", &request).await?;
        response.into_completion()
    }
}

#[async_trait]
impl SummaryProvider for OpenAIProvider {
    async fn summarize(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<Summary> {
        let request = TextCompletionRequest {
            model: &self.summary_model,
            prompt,
            temperature,
            max_tokens,
        };
        let response: TextCompletionResponse = self.post("completions", &request).await?;
        response.into_summary()
    }
}

#[async_trait]
impl ImageProvider for OpenAIProvider {
    async fn create_image(&self, request: &ImageRequest) -> Result<ImageResponse> {
        self.post("images/generations", request).await
    }
}

// Request types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Serialize)]
struct TextCompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

// Response types

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_completion(self) -> Result<Completion> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnexpectedResponse("no choices in chat response".into()))?;

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            usage: self.usage.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TextCompletionResponse {
    #[serde(default)]
    choices: Vec<TextChoice>,
}

#[derive(Debug, Deserialize)]
struct TextChoice {
    #[serde(default)]
    text: Option<String>,
}

impl TextCompletionResponse {
    fn into_summary(self) -> Result<Summary> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::UnexpectedResponse(
                "completion returned no summary text".into(),
            ));
        }

        Ok(Summary { text })
    }
}
