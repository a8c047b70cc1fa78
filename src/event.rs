//! Decodes one lifecycle event record (the hook's stdin payload) into a
//! tagged [`Event`]. Decoding never throws outward: anything that doesn't
//! name a known event kind, or isn't even valid JSON, yields `None` rather
//! than an error.

use serde_json::Value;

/// Reason a session started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStartSource {
    Startup,
    Resume,
    Clear,
    Compact,
    Unknown(String),
}

impl SessionStartSource {
    fn from_str(s: &str) -> Self {
        match s {
            "startup" => Self::Startup,
            "resume" => Self::Resume,
            "clear" => Self::Clear,
            "compact" => Self::Compact,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEndReason {
    Other(String),
}

/// The notification subtype carried by a `Notification` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    ElicitationDialog,
    PermissionPrompt,
    IdlePrompt,
    AuthSuccess,
    Unknown(String),
}

impl NotificationKind {
    fn from_str(s: &str) -> Self {
        match s {
            "elicitation_dialog" => Self::ElicitationDialog,
            "permission_prompt" => Self::PermissionPrompt,
            "idle_prompt" => Self::IdlePrompt,
            "auth_success" => Self::AuthSuccess,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// One decoded lifecycle event. Forward-compatible: unknown notification
/// kinds are preserved verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SessionStart {
        source: SessionStartSource,
    },
    Stop {
        active: bool,
    },
    PermissionRequest {
        tool_name: String,
        tool_input: Value,
    },
    UserPromptSubmit {
        prompt: String,
    },
    SessionEnd {
        reason: SessionEndReason,
    },
    Notification {
        kind: NotificationKind,
        message: String,
    },
}

/// Decode one hook event record. Returns `None` for anything that doesn't
/// name one of the six known variants, including malformed input.
pub fn decode(payload: &Value) -> Option<Event> {
    let hook_event_name = payload.get("hook_event_name")?.as_str()?;

    let event = match hook_event_name {
        "SessionStart" => {
            let source = payload
                .get("source")
                .and_then(Value::as_str)
                .unwrap_or("startup");
            Event::SessionStart {
                source: SessionStartSource::from_str(source),
            }
        }
        "Stop" => {
            let active = payload
                .get("stop_hook_active")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Event::Stop { active }
        }
        "PermissionRequest" => {
            let tool_name = payload
                .get("tool_name")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let tool_input = payload.get("tool_input").cloned().unwrap_or(Value::Null);
            Event::PermissionRequest {
                tool_name,
                tool_input,
            }
        }
        "UserPromptSubmit" => {
            let prompt = payload
                .get("prompt")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            Event::UserPromptSubmit { prompt }
        }
        "SessionEnd" => {
            let reason = payload
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("other")
                .to_string();
            Event::SessionEnd {
                reason: SessionEndReason::Other(reason),
            }
        }
        "Notification" => {
            let kind = payload
                .get("notification_type")
                .and_then(Value::as_str)
                .map(NotificationKind::from_str)
                .unwrap_or(NotificationKind::Unknown("unknown".to_string()));
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            Event::Notification { kind, message }
        }
        _ => return None,
    };

    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_session_start_with_default_source() {
        let payload = json!({"hook_event_name": "SessionStart"});
        let event = decode(&payload).unwrap();
        assert_eq!(
            event,
            Event::SessionStart {
                source: SessionStartSource::Startup
            }
        );
    }

    #[test]
    fn decodes_session_start_resume() {
        let payload = json!({"hook_event_name": "SessionStart", "source": "resume"});
        assert_eq!(
            decode(&payload).unwrap(),
            Event::SessionStart {
                source: SessionStartSource::Resume
            }
        );
    }

    #[test]
    fn decodes_stop_with_default_active() {
        let payload = json!({"hook_event_name": "Stop"});
        assert_eq!(decode(&payload).unwrap(), Event::Stop { active: false });
    }

    #[test]
    fn decodes_notification_preserves_unknown_kind() {
        let payload = json!({
            "hook_event_name": "Notification",
            "notification_type": "some_future_kind",
            "message": "hi"
        });
        match decode(&payload).unwrap() {
            Event::Notification { kind, message } => {
                assert_eq!(kind, NotificationKind::Unknown("some_future_kind".into()));
                assert_eq!(message, "hi");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_name_returns_none() {
        let payload = json!({"hook_event_name": "SomethingElse"});
        assert_eq!(decode(&payload), None);
    }

    #[test]
    fn missing_event_name_returns_none() {
        let payload = json!({"foo": "bar"});
        assert_eq!(decode(&payload), None);
    }

    #[test]
    fn permission_request_defaults_tool_name() {
        let payload = json!({"hook_event_name": "PermissionRequest"});
        match decode(&payload).unwrap() {
            Event::PermissionRequest { tool_name, .. } => assert_eq!(tool_name, "unknown"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn user_prompt_submit_defaults_empty_prompt() {
        let payload = json!({"hook_event_name": "UserPromptSubmit"});
        assert_eq!(
            decode(&payload).unwrap(),
            Event::UserPromptSubmit {
                prompt: String::new()
            }
        );
    }
}
