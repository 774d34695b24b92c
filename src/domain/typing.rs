use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

/// Per-channel set of identities currently typing.
///
/// A typing-stop signal removes the identity, but a dropped stop frame must
/// not leave a stuck indicator: every entry self-expires `ttl` after the
/// last start signal.
#[derive(Debug)]
pub struct TypingTracker {
    ttl: Duration,
    channels: HashMap<String, HashMap<String, Instant>>,
}

impl TypingTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            channels: HashMap::new(),
        }
    }

    pub fn apply(&mut self, channel_id: &str, user_id: &str, is_typing: bool, now: Instant) {
        let channel = self.channels.entry(channel_id.to_owned()).or_default();
        if is_typing {
            channel.insert(user_id.to_owned(), now);
        } else {
            channel.remove(user_id);
        }
    }

    /// Identities typing in the channel, expired entries pruned.
    pub fn typing_in(&mut self, channel_id: &str, now: Instant) -> Vec<String> {
        let ttl = self.ttl;
        let Some(channel) = self.channels.get_mut(channel_id) else {
            return Vec::new();
        };

        channel.retain(|_, started| now.duration_since(*started) < ttl);

        let mut users: Vec<String> = channel.keys().cloned().collect();
        users.sort();
        users
    }

    pub fn clear_channel(&mut self, channel_id: &str) {
        self.channels.remove(channel_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> TypingTracker {
        TypingTracker::new(Duration::from_secs(5))
    }

    #[test]
    fn start_signal_adds_identity_to_channel_set() {
        let mut tracker = tracker();
        let now = Instant::now();

        tracker.apply("3", "42", true, now);

        assert_eq!(tracker.typing_in("3", now), vec!["42".to_owned()]);
        assert!(tracker.typing_in("4", now).is_empty());
    }

    #[test]
    fn stop_signal_removes_identity() {
        let mut tracker = tracker();
        let now = Instant::now();

        tracker.apply("3", "42", true, now);
        tracker.apply("3", "42", false, now);

        assert!(tracker.typing_in("3", now).is_empty());
    }

    #[test]
    fn entry_self_expires_without_stop_signal() {
        let mut tracker = tracker();
        let start = Instant::now();

        tracker.apply("3", "42", true, start);

        let before_expiry = start + Duration::from_millis(4_999);
        assert_eq!(tracker.typing_in("3", before_expiry), vec!["42".to_owned()]);

        let after_expiry = start + Duration::from_secs(5);
        assert!(tracker.typing_in("3", after_expiry).is_empty());
    }

    #[test]
    fn repeated_start_signal_extends_expiry() {
        let mut tracker = tracker();
        let start = Instant::now();

        tracker.apply("3", "42", true, start);
        tracker.apply("3", "42", true, start + Duration::from_secs(3));

        let probe = start + Duration::from_secs(6);
        assert_eq!(tracker.typing_in("3", probe), vec!["42".to_owned()]);
    }

    #[test]
    fn channels_are_independent() {
        let mut tracker = tracker();
        let now = Instant::now();

        tracker.apply("3", "42", true, now);
        tracker.apply("4", "7", true, now);
        tracker.clear_channel("3");

        assert!(tracker.typing_in("3", now).is_empty());
        assert_eq!(tracker.typing_in("4", now), vec!["7".to_owned()]);
    }
}
