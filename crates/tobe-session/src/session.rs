//! Session controller: the turn loop.

use std::sync::Arc;

use tobe_ai::{CompletionProvider, Message, SummaryProvider, Usage};
use uuid::Uuid;

use crate::{
    budget::TokenBudget,
    compaction::{
        CompactionConfig, CompactionOutcome, CompactionProtocol, CompactionReason,
        CompactionState,
    },
    conversation::ConversationState,
    error::{Error, Result},
    events::SessionEvent,
    ports::{InputPort, OutputPort},
};

/// Default priming prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "Pretend you are an expert on real estate, marketing \
and sales. Be playful and formal, and always answer in Spanish.";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier passed to the completion provider
    pub model: String,
    /// System message that opens the conversation
    pub system_prompt: String,
    /// Assistant acknowledgement that follows the system message
    pub priming_reply: String,
    /// Consumed tokens that trigger compaction
    pub token_ceiling: u64,
    /// Label shown when asking for input
    pub prompt_label: String,
    pub compaction: CompactionConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            priming_reply: "OK".to_string(),
            token_ceiling: 4096,
            prompt_label: ">:".to_string(),
            compaction: CompactionConfig::default(),
        }
    }
}

/// What one completed turn produced
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: String,
    pub usage: Usage,
    /// Set when the turn ended with a successful compaction
    pub compaction: Option<CompactionOutcome>,
}

/// Owns one conversation and runs it turn by turn.
pub struct SessionController {
    id: Uuid,
    config: SessionConfig,
    conversation: ConversationState,
    budget: TokenBudget,
    compaction: CompactionProtocol,
    completion: Arc<dyn CompletionProvider>,
    summarizer: Arc<dyn SummaryProvider>,
    turns: u32,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        completion: Arc<dyn CompletionProvider>,
        summarizer: Arc<dyn SummaryProvider>,
    ) -> Result<Self> {
        let budget = TokenBudget::new(config.token_ceiling)?;
        let conversation = ConversationState::primed(&config.system_prompt, &config.priming_reply);
        let compaction = CompactionProtocol::new(config.compaction.clone());

        Ok(Self {
            id: Uuid::new_v4(),
            config,
            conversation,
            budget,
            compaction,
            completion,
            summarizer,
            turns: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn budget(&self) -> &TokenBudget {
        &self.budget
    }

    pub fn compaction_state(&self) -> CompactionState {
        self.compaction.state()
    }

    /// Number of turns started so far
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Switch the model used for the following turns
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Run one turn: record the user input, ask for a reply, account for
    /// usage, compact if due and render.
    ///
    /// A completion failure abandons the turn with the user message already
    /// recorded. A summary failure still renders the turn, then returns
    /// [`Error::SummarizationFailed`].
    pub async fn turn(
        &mut self,
        input: impl Into<String>,
        output: &mut dyn OutputPort,
    ) -> Result<TurnOutcome> {
        self.turns += 1;
        let turn_number = self.turns;
        output.on_event(&SessionEvent::TurnStart { turn_number });

        self.conversation.add(Message::user(input));

        let completion = self
            .completion
            .complete(&self.config.model, self.conversation.wire_messages())
            .await
            .map_err(|e| {
                tracing::warn!(session = %self.id, turn_number, error = %e, "completion failed");
                Error::CompletionFailed(e)
            })?;

        self.budget
            .record_usage(i64::from(completion.usage.total_tokens))?;
        self.conversation
            .add(Message::assistant(completion.text.clone()));

        tracing::debug!(
            session = %self.id,
            turn_number,
            total_tokens = completion.usage.total_tokens,
            used = self.budget.used(),
            ceiling = self.budget.ceiling(),
            "turn complete"
        );
        output.on_event(&SessionEvent::TurnEnd {
            turn_number,
            usage: completion.usage,
            used_tokens: self.budget.used(),
        });

        let compaction = if self.compaction.evaluate(&self.budget) {
            Some(self.run_compaction(CompactionReason::Threshold, output).await)
        } else {
            None
        };

        output.render(self.conversation.history(), self.budget.used());

        Ok(TurnOutcome {
            reply: completion.text,
            usage: completion.usage,
            compaction: compaction.transpose()?,
        })
    }

    /// Compact now, whatever the budget says
    pub async fn compact_now(&mut self, output: &mut dyn OutputPort) -> Result<CompactionOutcome> {
        self.run_compaction(CompactionReason::Manual, output).await
    }

    /// Read and run turns until the input port ends the session.
    ///
    /// Turn errors are returned as they happen; the conversation is left
    /// intact, so the caller may call `run` again.
    pub async fn run(
        &mut self,
        input: &mut dyn InputPort,
        output: &mut dyn OutputPort,
    ) -> Result<()> {
        while let Some(text) = input.read_user_input(&self.config.prompt_label)? {
            self.turn(text, output).await?;
        }
        tracing::debug!(session = %self.id, turns = self.turns, "session ended");
        Ok(())
    }

    async fn run_compaction(
        &mut self,
        reason: CompactionReason,
        output: &mut dyn OutputPort,
    ) -> Result<CompactionOutcome> {
        output.on_event(&SessionEvent::CompactionStart { reason });

        let result = self
            .compaction
            .run(
                reason,
                &mut self.conversation,
                &mut self.budget,
                self.summarizer.as_ref(),
            )
            .await;

        match &result {
            Ok(outcome) => output.on_event(&SessionEvent::CompactionEnd {
                messages_before: outcome.messages_before,
                messages_after: outcome.messages_after,
            }),
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "compaction failed");
                output.on_event(&SessionEvent::CompactionFailed {
                    message: e.to_string(),
                });
            }
        }

        result
    }
}
