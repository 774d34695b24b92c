//! Use case for sending a chat message.
//!
//! Persistence is the authoritative path: the message only exists once the
//! REST collaborator has accepted it. The realtime frame is a best-effort
//! notification sent afterwards, so peers refresh without waiting for their
//! next poll; losing it degrades freshness, never correctness.

use thiserror::Error;

use crate::{
    api::{contracts::MessagePersister, ApiError},
    domain::message::Message,
    sync::dispatch::OutboundDispatcher,
};

/// Command to send a message to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendChatCommand {
    pub channel_id: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum SendChatError {
    /// Message text is empty after trimming whitespace.
    #[error("message text is empty")]
    EmptyMessage,
    /// The authoritative write was rejected; nothing was notified.
    #[error("message could not be persisted")]
    Persistence(#[source] ApiError),
}

/// Validates and persists the message, then notifies connected peers.
///
/// The notification is skipped entirely when persistence fails: peers must
/// never be told about a message the server does not have.
pub async fn send_chat<P>(
    persister: &P,
    dispatcher: &OutboundDispatcher,
    command: SendChatCommand,
) -> Result<Message, SendChatError>
where
    P: MessagePersister,
{
    let content = command.content.trim();
    if content.is_empty() {
        return Err(SendChatError::EmptyMessage);
    }

    let message = persister
        .create_message(&command.channel_id, content)
        .await
        .map_err(SendChatError::Persistence)?;

    dispatcher.send_chat(content, &command.channel_id);

    Ok(message)
}
