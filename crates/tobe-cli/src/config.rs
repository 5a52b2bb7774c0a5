//! Configuration file support

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tobe_ai::providers::openai::API_KEY_ENV_VARS;

/// Configuration for tobe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat model to use
    pub model: Option<String>,
    /// Model used to summarize the conversation
    pub summary_model: Option<String>,
    /// Sampling temperature for conversation summaries. Chat replies use the
    /// provider's default temperature.
    pub temperature: Option<f32>,
    /// Consumed tokens that trigger compaction
    pub token_ceiling: Option<u64>,
    /// Custom system prompt
    pub system_prompt: Option<String>,
    /// API root (for proxies or compatible servers)
    pub base_url: Option<String>,
    /// Image size for image mode (256x256, 512x512, 1024x1024)
    pub image_size: Option<String>,
    /// Compaction settings
    pub compaction: Option<CompactionSettings>,
    /// API keys (alternative to environment variables)
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// Compaction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionSettings {
    pub enabled: Option<bool>,
    /// History messages kept after the summary
    pub keep_recent: Option<usize>,
    /// Reset the consumed-token count after compacting
    pub reset_usage: Option<bool>,
    /// Summary prompt with {max_tokens} and {conversation} placeholders
    pub prompt_template: Option<String>,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub openai: Option<String>,
}

impl Config {
    /// Config file location: `TOBE_CONFIG_PATH`, else `tobe/config.toml` under
    /// the platform config directory
    pub fn config_path() -> PathBuf {
        std::env::var_os("TOBE_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("tobe")
                    .join("config.toml")
            })
    }

    /// Parse the config at `path`. A missing file is `Ok(None)`.
    pub fn read(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", path.display()));
            }
        };
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(Some(config))
    }

    /// Load the user's config. Unreadable or invalid files fall back to
    /// defaults with a warning.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::read(&path) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = format!("{e:#}"), "ignoring config file");
                Self::default()
            }
        }
    }

    /// Write the config as TOML, creating parent directories
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
    }

    /// Settings written by `--init-config`
    fn starter() -> Self {
        Config {
            model: Some("gpt-3.5-turbo".to_string()),
            temperature: Some(0.7),
            token_ceiling: Some(4096),
            image_size: Some("512x512".to_string()),
            ..Default::default()
        }
    }

    /// Write the starter config unless a config file already exists
    pub fn init() -> anyhow::Result<PathBuf> {
        let path = Self::config_path();
        if !path.exists() {
            Self::starter().write_to(&path)?;
        }
        Ok(path)
    }

    /// Get the OpenAI API key, checking config then env
    pub fn api_key(&self) -> Option<String> {
        self.api_key_from(API_KEY_ENV_VARS)
    }

    fn api_key_from(&self, env_vars: &[&str]) -> Option<String> {
        tobe_ai::providers::get_api_key(self.api_keys.openai.as_deref(), env_vars).ok()
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# tobe configuration file
# Place at ~/.config/tobe/config.toml (Linux) or set TOBE_CONFIG_PATH

# Chat model
model = "gpt-3.5-turbo"

# Model used for conversation summaries (completions endpoint)
# summary_model = "gpt-3.5-turbo-instruct"

# Sampling temperature for conversation summaries (chat replies use the
# provider default)
temperature = 0.7

# Tokens consumed before the conversation is compacted
token_ceiling = 4096

# Custom system prompt (optional)
# system_prompt = "You are a helpful assistant."

# API root (optional)
# base_url = "https://api.openai.com/v1"

# Image size for --image (256x256, 512x512, 1024x1024)
image_size = "512x512"

[compaction]
# enabled = true
# keep_recent = 2
# Reset the token count after compacting (false compacts on every turn
# once the ceiling has been reached)
# reset_usage = true

# API keys (optional - OPENAI_API_KEY or OPEN_AI_TOKEN also work)
[api_keys]
# openai = "sk-..."
"#
}
