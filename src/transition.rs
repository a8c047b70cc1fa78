//! Pure mapping from a lifecycle event to a state change. Carries no state
//! of its own and is total over the event sum.

use crate::event::{Event, NotificationKind};

/// Why a pane is waiting on the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionReason {
    Done,
    Permission,
    Question,
}

/// The attention state of a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Working,
    NeedsAttention(AttentionReason),
}

impl State {
    /// Bijective encoding used for persistence. Decoding an unrecognised
    /// string must fail rather than silently default.
    pub fn encode(self) -> &'static str {
        match self {
            State::Working => "working",
            State::NeedsAttention(AttentionReason::Done) => "needs_attention:done",
            State::NeedsAttention(AttentionReason::Permission) => "needs_attention:permission",
            State::NeedsAttention(AttentionReason::Question) => "needs_attention:question",
        }
    }

    pub fn decode(s: &str) -> Option<State> {
        match s {
            "working" => Some(State::Working),
            "needs_attention:done" => Some(State::NeedsAttention(AttentionReason::Done)),
            "needs_attention:permission" => {
                Some(State::NeedsAttention(AttentionReason::Permission))
            }
            "needs_attention:question" => {
                Some(State::NeedsAttention(AttentionReason::Question))
            }
            _ => None,
        }
    }
}

/// Outcome of applying the transition function to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(State),
    NoChange,
    Delete,
}

/// Pure event → transition mapping. See §4.3 of the component design.
pub fn transition(event: &Event) -> Transition {
    match event {
        Event::SessionStart { .. } => Transition::To(State::Working),
        Event::UserPromptSubmit { .. } => Transition::To(State::Working),
        Event::Stop { .. } => Transition::To(State::NeedsAttention(AttentionReason::Done)),
        Event::PermissionRequest { .. } => {
            Transition::To(State::NeedsAttention(AttentionReason::Permission))
        }
        Event::Notification {
            kind: NotificationKind::ElicitationDialog,
            ..
        } => Transition::To(State::NeedsAttention(AttentionReason::Question)),
        Event::Notification { .. } => Transition::NoChange,
        Event::SessionEnd { .. } => Transition::Delete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{SessionEndReason, SessionStartSource};

    #[test]
    fn state_encode_decode_round_trip() {
        let states = [
            State::Working,
            State::NeedsAttention(AttentionReason::Done),
            State::NeedsAttention(AttentionReason::Permission),
            State::NeedsAttention(AttentionReason::Question),
        ];
        for state in states {
            assert_eq!(State::decode(state.encode()), Some(state));
        }
    }

    #[test]
    fn decode_rejects_unknown_string() {
        assert_eq!(State::decode("bogus"), None);
    }

    // S1 — transition table.
    #[test]
    fn session_start_resume_is_working() {
        let event = Event::SessionStart {
            source: SessionStartSource::Resume,
        };
        assert_eq!(transition(&event), Transition::To(State::Working));
    }

    #[test]
    fn stop_is_needs_attention_done() {
        let event = Event::Stop { active: false };
        assert_eq!(
            transition(&event),
            Transition::To(State::NeedsAttention(AttentionReason::Done))
        );
    }

    #[test]
    fn idle_prompt_notification_is_no_change() {
        let event = Event::Notification {
            kind: NotificationKind::IdlePrompt,
            message: "x".to_string(),
        };
        assert_eq!(transition(&event), Transition::NoChange);
    }

    #[test]
    fn elicitation_dialog_is_needs_attention_question() {
        let event = Event::Notification {
            kind: NotificationKind::ElicitationDialog,
            message: "pick".to_string(),
        };
        assert_eq!(
            transition(&event),
            Transition::To(State::NeedsAttention(AttentionReason::Question))
        );
    }

    #[test]
    fn session_end_deletes() {
        let event = Event::SessionEnd {
            reason: SessionEndReason::Other("other".to_string()),
        };
        assert_eq!(transition(&event), Transition::Delete);
    }
}
