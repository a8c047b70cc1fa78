//! Opaque identifier wrappers.
//!
//! Panes, sessions, messages, and chunks are all addressed by strings, but
//! they are never interchangeable: a session id passed where a pane id is
//! expected is a bug, not a type error caught by the compiler unless each
//! gets its own newtype. None of these types implement `Deref` or `From`
//! for one another on purpose.

use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_type!(PaneId);
id_type!(SessionId);
id_type!(MessageId);
id_type!(ChunkId);

impl ChunkId {
    /// Multi-chunk turns use `"{turn_id}:{index}"`; single-chunk turns use the turn id verbatim.
    pub fn for_turn(turn_id: &MessageId, index: Option<usize>) -> Self {
        match index {
            None => ChunkId(turn_id.as_str().to_string()),
            Some(i) => ChunkId(format!("{turn_id}:{i}")),
        }
    }
}
