//! The subset of a transcript record's shape this system cares about:
//! `user` and `assistant` messages. Every other `type` is skipped by the
//! caller before it ever reaches these types.

use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, SessionId};

/// One decoded transcript record of type `user` or `assistant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub role: Role,
    pub id: MessageId,
    pub parent_id: Option<MessageId>,
    pub session_id: SessionId,
    pub timestamp: String,
    pub cwd: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Raw on-disk shape of one transcript line, before text extraction.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    kind: String,
    uuid: Option<String>,
    #[serde(rename = "parentUuid")]
    parent_uuid: Option<String>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    timestamp: Option<String>,
    cwd: Option<String>,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    content: ContentValue,
}

/// Content may be a bare string (user messages) or an array of typed
/// blocks (assistant messages); other block types besides `text` are
/// dropped.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum ContentValue {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl ContentValue {
    fn extract_text(&self) -> String {
        match self {
            ContentValue::Text(s) => s.clone(),
            ContentValue::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    ContentBlock::Other => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Decode one JSONL line into a `TranscriptMessage`. Returns `None` if the
/// record's `type` is not `user`/`assistant`, or if required fields are
/// missing (an undecipherable record is skipped, not an error).
pub fn decode_line(line: &str) -> Option<TranscriptMessage> {
    let raw: RawRecord = serde_json::from_str(line).ok()?;

    let role = match raw.kind.as_str() {
        "user" => Role::User,
        "assistant" => Role::Assistant,
        _ => return None,
    };

    let id = MessageId::new(raw.uuid?);
    let session_id = SessionId::new(raw.session_id.unwrap_or_default());
    let timestamp = raw.timestamp.unwrap_or_default();
    let cwd = raw.cwd.unwrap_or_default();
    let text = raw.message?.content.extract_text();

    Some(TranscriptMessage {
        role,
        id,
        parent_id: raw.parent_uuid.map(MessageId::new),
        session_id,
        timestamp,
        cwd,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_user_message_with_string_content() {
        let line = r#"{"type":"user","uuid":"u1","sessionId":"s1","timestamp":"2024-01-01T00:00:00Z","cwd":"/x","message":{"content":"hello"}}"#;
        let msg = decode_line(line).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.parent_id, None);
    }

    #[test]
    fn decodes_assistant_message_with_array_content_joining_text_blocks() {
        let line = r#"{"type":"assistant","uuid":"a1","parentUuid":"u1","sessionId":"s1","timestamp":"t","cwd":"/x","message":{"content":[{"type":"text","text":"part one"},{"type":"tool_use","id":"x","name":"y","input":{}},{"type":"text","text":"part two"}]}}"#;
        let msg = decode_line(line).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text, "part one\npart two");
        assert_eq!(msg.parent_id, Some(MessageId::new("u1")));
    }

    #[test]
    fn skips_non_message_record_types() {
        let line = r#"{"type":"progress","data":{}}"#;
        assert_eq!(decode_line(line), None);
    }

    #[test]
    fn skips_malformed_json() {
        assert_eq!(decode_line("not json"), None);
    }

    #[test]
    fn skips_message_missing_uuid() {
        let line = r#"{"type":"user","sessionId":"s1","message":{"content":"hi"}}"#;
        assert_eq!(decode_line(line), None);
    }
}
