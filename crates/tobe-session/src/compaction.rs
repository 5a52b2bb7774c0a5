//! Context compaction for long conversations
//!
//! Once the token budget is spent, the whole history is summarized by the
//! summary provider and the current window is rebuilt as the summary plus the
//! most recent messages. History itself is never rewritten.

use serde::{Deserialize, Serialize};
use tobe_ai::{Message, SummaryProvider};

use crate::{
    budget::TokenBudget,
    conversation::ConversationState,
    error::{Error, Result},
};

/// Default summarization prompt. `{max_tokens}` and `{conversation}` are
/// substituted when the request is built.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Genera un resumen de los puntos más importantes de la siguiente conversación, \
en un máximo de {max_tokens} tokens. El resumen sustituirá a la conversación, \
así que conserva los datos que el asistente necesita para continuarla.

{conversation}";

/// What happens to the consumed-token count after a successful compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAfterCompaction {
    /// Start counting from zero, so the next compaction happens after
    /// another `ceiling` tokens
    #[default]
    Reset,
    /// Keep the running total; once the ceiling is crossed every following
    /// turn compacts again
    Keep,
}

/// Configuration for context compaction
#[derive(Debug, Clone)]
pub struct CompactionConfig {
    /// Whether threshold compaction is enabled
    pub enabled: bool,
    /// History messages kept verbatim after the summary
    pub keep_recent: usize,
    /// Sampling temperature for the summary call
    pub temperature: f32,
    /// Prompt with `{max_tokens}` and `{conversation}` placeholders
    pub prompt_template: String,
    pub usage_policy: UsageAfterCompaction,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keep_recent: 2,
            temperature: 0.7,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            usage_policy: UsageAfterCompaction::Reset,
        }
    }
}

/// Reason for compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactionReason {
    /// Token budget spent
    Threshold,
    /// Requested by the user
    Manual,
}

/// Where the protocol stands relative to the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactionState {
    #[default]
    Normal,
    OverBudget,
    Compacting,
}

/// Summarization request built from the history
#[derive(Debug, Clone, PartialEq)]
pub struct CompactionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// What a successful compaction did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionOutcome {
    pub reason: CompactionReason,
    /// Length of the current view before compaction
    pub messages_before: usize,
    /// Length of the current view after compaction
    pub messages_after: usize,
    /// Tokens consumed when compaction started
    pub used_before: u64,
}

/// Drives the Normal → OverBudget → Compacting → Normal cycle.
#[derive(Debug, Clone, Default)]
pub struct CompactionProtocol {
    config: CompactionConfig,
    state: CompactionState,
}

impl CompactionProtocol {
    pub fn new(config: CompactionConfig) -> Self {
        Self {
            config,
            state: CompactionState::Normal,
        }
    }

    pub fn config(&self) -> &CompactionConfig {
        &self.config
    }

    pub fn state(&self) -> CompactionState {
        self.state
    }

    /// Re-check the budget after a turn. Returns `true` when compaction is due.
    pub fn evaluate(&mut self, budget: &TokenBudget) -> bool {
        self.state = if self.config.enabled && budget.is_over_budget() {
            CompactionState::OverBudget
        } else {
            CompactionState::Normal
        };
        self.is_due()
    }

    pub fn is_due(&self) -> bool {
        self.state == CompactionState::OverBudget
    }

    /// Build the summarization request for the given history.
    ///
    /// The target length is a third of the ceiling.
    pub fn build_request(&self, history: &[Message], ceiling: u64) -> CompactionRequest {
        let max_tokens = u32::try_from(ceiling / 3).unwrap_or(u32::MAX).max(1);
        let prompt = self
            .config
            .prompt_template
            .replace("{max_tokens}", &max_tokens.to_string())
            .replace("{conversation}", &serialize_history(history));

        CompactionRequest {
            prompt,
            temperature: self.config.temperature,
            max_tokens,
        }
    }

    /// Summarize the history and rebuild the current view.
    ///
    /// On failure nothing is modified and the protocol falls back to
    /// `OverBudget` (or `Normal` if the budget was not spent), so the next
    /// evaluation tries again.
    pub async fn run(
        &mut self,
        reason: CompactionReason,
        conversation: &mut ConversationState,
        budget: &mut TokenBudget,
        summarizer: &dyn SummaryProvider,
    ) -> Result<CompactionOutcome> {
        self.state = CompactionState::Compacting;

        let request = self.build_request(conversation.history(), budget.ceiling());
        let messages_before = conversation.current().len();
        let used_before = budget.used();

        tracing::debug!(
            ?reason,
            history = conversation.history().len(),
            max_tokens = request.max_tokens,
            "requesting summary"
        );

        let summary = match summarizer
            .summarize(&request.prompt, request.temperature, request.max_tokens)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                self.state = if budget.is_over_budget() {
                    CompactionState::OverBudget
                } else {
                    CompactionState::Normal
                };
                return Err(Error::SummarizationFailed(e));
            }
        };

        conversation.compact(Message::assistant(summary.text), self.config.keep_recent);
        if self.config.usage_policy == UsageAfterCompaction::Reset {
            budget.reset();
        }
        self.state = CompactionState::Normal;

        let outcome = CompactionOutcome {
            reason,
            messages_before,
            messages_after: conversation.current().len(),
            used_before,
        };
        tracing::info!(
            ?reason,
            messages_before,
            messages_after = outcome.messages_after,
            used_before,
            "conversation compacted"
        );
        Ok(outcome)
    }
}

/// Render the history as plain `Role: content` lines for the summary prompt
fn serialize_history(history: &[Message]) -> String {
    let mut out = String::new();
    for msg in history {
        out.push_str(msg.role().title());
        out.push_str(": ");
        out.push_str(msg.content());
        out.push('\n');
    }
    out
}
