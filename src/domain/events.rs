use serde::{Deserialize, Serialize};

/// An event pushed by the server over the live connection.
///
/// The wire format is a JSON object discriminated by `type`. Events are
/// ephemeral: the authoritative copy of anything durable lives server-side
/// and is read back through the REST collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    #[serde(rename = "message")]
    ChatMessage {
        user_id: String,
        channel_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_name: Option<String>,
        #[serde(default)]
        timestamp: Option<f64>,
    },
    #[serde(rename = "typing")]
    TypingSignal {
        user_id: String,
        channel_id: String,
        is_typing: bool,
        #[serde(default)]
        timestamp: Option<f64>,
    },
    #[serde(rename = "user_connected")]
    PresenceJoined {
        user_id: String,
        #[serde(default)]
        timestamp: Option<f64>,
    },
    #[serde(rename = "user_disconnected")]
    PresenceLeft {
        user_id: String,
        #[serde(default)]
        timestamp: Option<f64>,
    },
}

impl InboundEvent {
    /// Identity that caused the event.
    pub fn origin(&self) -> &str {
        match self {
            Self::ChatMessage { user_id, .. }
            | Self::TypingSignal { user_id, .. }
            | Self::PresenceJoined { user_id, .. }
            | Self::PresenceLeft { user_id, .. } => user_id,
        }
    }

    /// Channel the event belongs to, when it is channel-scoped.
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Self::ChatMessage { channel_id, .. } | Self::TypingSignal { channel_id, .. } => {
                Some(channel_id)
            }
            Self::PresenceJoined { .. } | Self::PresenceLeft { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Option<f64> {
        match self {
            Self::ChatMessage { timestamp, .. }
            | Self::TypingSignal { timestamp, .. }
            | Self::PresenceJoined { timestamp, .. }
            | Self::PresenceLeft { timestamp, .. } => *timestamp,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::ChatMessage { .. } => "message",
            Self::TypingSignal { .. } => "typing",
            Self::PresenceJoined { .. } => "user_connected",
            Self::PresenceLeft { .. } => "user_disconnected",
        }
    }
}

/// A frame the client writes to the live connection.
///
/// Chat content sent here is a notification-only side channel; persistence
/// happens through the REST collaborator and never depends on these frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Message {
        content: String,
        channel_id: String,
    },
    Typing {
        channel_id: String,
        is_typing: bool,
    },
}
