use std::time::{Duration, Instant};

use crate::domain::{events::InboundEvent, typing::TypingTracker};

/// Caller-visible effect of a deduplicated, delivered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Re-read the channel's authoritative message list. Re-fetching the
    /// whole list sidesteps ordering, edit, delete, and reaction hazards
    /// that an incremental patch would have to get right.
    RefetchChannel(String),
    Ignore,
}

/// Decides, per event kind, whether receipt requires a resync of
/// authoritative state or only a local ephemeral update.
#[derive(Debug)]
pub struct ReconcilePolicy {
    self_identity: String,
    typing: TypingTracker,
}

impl ReconcilePolicy {
    pub fn new(self_identity: impl Into<String>, typing_ttl: Duration) -> Self {
        Self {
            self_identity: self_identity.into(),
            typing: TypingTracker::new(typing_ttl),
        }
    }

    pub fn apply(
        &mut self,
        event: &InboundEvent,
        active_channel: Option<&str>,
        now: Instant,
    ) -> ReconcileAction {
        match event {
            InboundEvent::ChatMessage {
                user_id,
                channel_id,
                ..
            } => {
                if user_id == &self.self_identity {
                    // Our own persistence call already returned the
                    // authoritative record; no extra round-trip.
                    return ReconcileAction::Ignore;
                }
                if active_channel == Some(channel_id.as_str()) {
                    return ReconcileAction::RefetchChannel(channel_id.clone());
                }
                ReconcileAction::Ignore
            }
            InboundEvent::TypingSignal {
                user_id,
                channel_id,
                is_typing,
                ..
            } => {
                if user_id != &self.self_identity {
                    self.typing.apply(channel_id, user_id, *is_typing, now);
                }
                ReconcileAction::Ignore
            }
            // Presence is the reconciler's job; never touches message state.
            InboundEvent::PresenceJoined { .. } | InboundEvent::PresenceLeft { .. } => {
                ReconcileAction::Ignore
            }
        }
    }

    /// Identities currently typing in the channel, self-expired entries
    /// pruned.
    pub fn typing_in(&mut self, channel_id: &str, now: Instant) -> Vec<String> {
        self.typing.typing_in(channel_id, now)
    }
}
