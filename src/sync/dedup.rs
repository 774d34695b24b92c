use std::{
    collections::{hash_map::DefaultHasher, HashSet, VecDeque},
    hash::{Hash, Hasher},
};

use crate::domain::events::InboundEvent;

/// Derived dedup key for an inbound event.
///
/// The transport may redeliver and the server may double-publish under
/// retry; this key identifies such copies. It hashes the full content
/// rather than a truncated prefix, so two distinct rapid-fire messages
/// from the same sender in the same channel never collide on a shared
/// leading substring.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventFingerprint {
    kind: &'static str,
    origin: String,
    channel: Option<String>,
    content_hash: u64,
    time_bucket: u64,
}

impl EventFingerprint {
    pub fn of(event: &InboundEvent) -> Self {
        let content_hash = match event {
            InboundEvent::ChatMessage { content, .. } => hash_str(content),
            InboundEvent::TypingSignal { is_typing, .. } => u64::from(*is_typing),
            InboundEvent::PresenceJoined { .. } | InboundEvent::PresenceLeft { .. } => 0,
        };

        Self {
            kind: event.kind_label(),
            origin: event.origin().to_owned(),
            channel: event.channel_id().map(str::to_owned),
            content_hash,
            // 1-second buckets; redeliveries carry the original timestamp,
            // so copies land in the same bucket.
            time_bucket: event.timestamp().map(|ts| ts as u64).unwrap_or(0),
        }
    }
}

fn hash_str(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Suppresses re-delivery of events already seen within a bounded recent
/// window. Oldest fingerprints are evicted first once the window is full.
#[derive(Debug)]
pub struct EventDeduplicator {
    capacity: usize,
    seen: HashSet<EventFingerprint>,
    order: VecDeque<EventFingerprint>,
}

impl EventDeduplicator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns true exactly once per distinct fingerprint within the window.
    pub fn should_process(&mut self, event: &InboundEvent) -> bool {
        let fingerprint = EventFingerprint::of(event);
        if self.seen.contains(&fingerprint) {
            return false;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        self.seen.insert(fingerprint.clone());
        self.order.push_back(fingerprint);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(user: &str, channel: &str, content: &str, timestamp: f64) -> InboundEvent {
        InboundEvent::ChatMessage {
            user_id: user.to_owned(),
            channel_id: channel.to_owned(),
            content: content.to_owned(),
            sender_name: None,
            timestamp: Some(timestamp),
        }
    }

    #[test]
    fn exact_redelivery_is_suppressed() {
        let mut dedup = EventDeduplicator::new(64);
        let event = chat("7", "3", "hi", 1_024.0);

        assert!(dedup.should_process(&event));
        assert!(!dedup.should_process(&event));
        assert!(!dedup.should_process(&event));
    }

    #[test]
    fn distinct_rapid_messages_with_shared_prefix_both_pass() {
        let mut dedup = EventDeduplicator::new(64);
        let prefix = "a".repeat(60);
        let first = chat("7", "3", &format!("{prefix} one"), 1_024.2);
        let second = chat("7", "3", &format!("{prefix} two"), 1_024.8);

        // Same sender, channel, and timestamp bucket; only the tail differs.
        assert!(dedup.should_process(&first));
        assert!(dedup.should_process(&second));
    }

    #[test]
    fn same_content_from_different_channels_is_distinct() {
        let mut dedup = EventDeduplicator::new(64);

        assert!(dedup.should_process(&chat("7", "3", "hi", 1_024.0)));
        assert!(dedup.should_process(&chat("7", "4", "hi", 1_024.0)));
    }

    #[test]
    fn eviction_allows_reprocessing_after_window_rolls_over() {
        let mut dedup = EventDeduplicator::new(2);
        let first = chat("7", "3", "one", 1.0);

        assert!(dedup.should_process(&first));
        assert!(dedup.should_process(&chat("7", "3", "two", 2.0)));
        assert!(dedup.should_process(&chat("7", "3", "three", 3.0)));

        // "one" was evicted as oldest and is no longer recognized.
        assert!(dedup.should_process(&first));
    }

    #[test]
    fn typing_start_and_stop_have_distinct_fingerprints() {
        let mut dedup = EventDeduplicator::new(64);
        let start = InboundEvent::TypingSignal {
            user_id: "7".to_owned(),
            channel_id: "3".to_owned(),
            is_typing: true,
            timestamp: Some(10.0),
        };
        let stop = InboundEvent::TypingSignal {
            user_id: "7".to_owned(),
            channel_id: "3".to_owned(),
            is_typing: false,
            timestamp: Some(10.0),
        };

        assert!(dedup.should_process(&start));
        assert!(dedup.should_process(&stop));
        assert!(!dedup.should_process(&start));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut dedup = EventDeduplicator::new(0);
        let event = chat("7", "3", "hi", 1.0);

        assert!(dedup.should_process(&event));
        assert!(!dedup.should_process(&event));
    }
}
