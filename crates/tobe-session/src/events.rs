//! Session event types

use serde::Serialize;
use tobe_ai::Usage;

use crate::compaction::CompactionReason;

/// Events emitted while a session runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A turn started
    TurnStart { turn_number: u32 },

    /// The assistant replied
    TurnEnd {
        turn_number: u32,
        usage: Usage,
        used_tokens: u64,
    },

    /// Context compaction started
    CompactionStart { reason: CompactionReason },

    /// Context compaction completed
    CompactionEnd {
        messages_before: usize,
        messages_after: usize,
    },

    /// The summary call failed; the conversation continues uncompacted
    CompactionFailed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagged_by_type() {
        let event = SessionEvent::CompactionStart {
            reason: CompactionReason::Manual,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "compaction_start");
        assert_eq!(json["reason"], "manual");

        let event = SessionEvent::TurnEnd {
            turn_number: 2,
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            used_tokens: 40,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "turn_end");
        assert_eq!(json["usage"]["total_tokens"], 15);
        assert_eq!(json["used_tokens"], 40);
    }
}
