//! Turn pairer (C8): assembles (user, assistant) pairs from parent links.
//! Orphans — a user message with no reply, or an assistant message whose
//! parent is missing or not a user message — are dropped silently.

use std::collections::HashMap;

use crate::ids::{MessageId, SessionId};
use crate::transcript::{Role, TranscriptMessage};

/// One paired turn: a user message and the assistant message replying to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub turn_id: MessageId,
    pub session_id: SessionId,
    pub project_path: String,
    pub timestamp: String,
    pub user_text: String,
    pub assistant_text: String,
}

impl Turn {
    /// Exactly `"User: {user_text}\n\nAssistant: {assistant_text}"`.
    pub fn combined_text(&self) -> String {
        format!(
            "User: {}\n\nAssistant: {}",
            self.user_text, self.assistant_text
        )
    }
}

/// Pair up messages in source order. The turn id is the user message's id;
/// the project path is derived from the user message's `cwd`.
pub fn pair_turns(messages: &[TranscriptMessage]) -> Vec<Turn> {
    let by_id: HashMap<&MessageId, &TranscriptMessage> =
        messages.iter().map(|m| (&m.id, m)).collect();

    let mut turns = Vec::new();
    for msg in messages {
        if msg.role != Role::Assistant {
            continue;
        }
        let Some(parent_id) = &msg.parent_id else {
            continue;
        };
        let Some(parent) = by_id.get(parent_id) else {
            continue;
        };
        if parent.role != Role::User {
            continue;
        }

        turns.push(Turn {
            turn_id: parent.id.clone(),
            session_id: parent.session_id.clone(),
            project_path: parent.cwd.clone(),
            timestamp: parent.timestamp.clone(),
            user_text: parent.text.clone(),
            assistant_text: msg.text.clone(),
        });
    }
    turns
}
