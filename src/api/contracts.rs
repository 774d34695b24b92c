use std::future::Future;

use crate::{
    api::ApiError,
    domain::{message::Message, presence::PresenceSnapshot},
};

/// Authoritative source of the currently online identity set.
pub trait PresenceSource {
    fn fetch_online(&self) -> impl Future<Output = Result<PresenceSnapshot, ApiError>> + Send;
}

/// Authoritative source of a channel's message list.
pub trait ChannelMessagesSource {
    fn fetch_channel_messages(
        &self,
        channel_id: &str,
    ) -> impl Future<Output = Result<Vec<Message>, ApiError>> + Send;
}

/// Durable message creation; the realtime side channel is independent of it.
pub trait MessagePersister {
    fn create_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> impl Future<Output = Result<Message, ApiError>> + Send;
}
