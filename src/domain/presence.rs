use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// One identity's view entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Authoritative result of a presence poll: the complete set of identities
/// currently holding a live connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub online: Vec<String>,
}

/// Consistent online/offline view merged from push hints and polls.
///
/// Push hints are provisional and applied immediately for responsiveness.
/// A poll result replaces the whole view because the poll is ground truth;
/// a hint that raced ahead of it is overwritten.
#[derive(Debug, Default)]
pub struct PresenceView {
    entries: HashMap<String, PresenceEntry>,
}

impl PresenceView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a connection-derived hint for one identity.
    pub fn apply_hint(&mut self, user_id: &str, is_online: bool, now: DateTime<Utc>) {
        let entry = self.entries.entry(user_id.to_owned()).or_insert(PresenceEntry {
            is_online: false,
            last_seen: None,
        });
        entry.is_online = is_online;
        if !is_online {
            entry.last_seen = Some(now);
        }
    }

    /// Replaces the view with an authoritative snapshot.
    ///
    /// Identities missing from the snapshot are marked offline rather than
    /// dropped, so `last_seen` survives across polls.
    pub fn replace(&mut self, snapshot: &PresenceSnapshot, now: DateTime<Utc>) {
        for (user_id, entry) in &mut self.entries {
            if entry.is_online && !snapshot.online.iter().any(|id| id == user_id) {
                entry.is_online = false;
                entry.last_seen = Some(now);
            }
        }

        for user_id in &snapshot.online {
            let entry = self.entries.entry(user_id.clone()).or_insert(PresenceEntry {
                is_online: false,
                last_seen: None,
            });
            entry.is_online = true;
        }
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.entries
            .get(user_id)
            .map(|entry| entry.is_online)
            .unwrap_or(false)
    }

    pub fn online_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_online).count()
    }

    pub fn last_seen(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(user_id).and_then(|entry| entry.last_seen)
    }
}
