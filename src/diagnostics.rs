//! Counters for the synchronization core.
//!
//! Production logic only ever writes here; the snapshot is read by debug
//! surfaces (the headless runner logs it on shutdown). This replaces the
//! ad-hoc globals the browser client hung off `window`.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SyncDiagnostics {
    frames_received: AtomicU64,
    frames_malformed: AtomicU64,
    duplicates_suppressed: AtomicU64,
    events_delivered: AtomicU64,
    listener_panics: AtomicU64,
    reconnect_attempts: AtomicU64,
    sends_dropped: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticsSnapshot {
    pub frames_received: u64,
    pub frames_malformed: u64,
    pub duplicates_suppressed: u64,
    pub events_delivered: u64,
    pub listener_panics: u64,
    pub reconnect_attempts: u64,
    pub sends_dropped: u64,
}

impl SyncDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_malformed(&self) {
        self.frames_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_suppressed(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_listener_panic(&self) {
        self.listener_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect_attempt(&self) {
        self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_dropped(&self) {
        self.sends_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_malformed: self.frames_malformed.load(Ordering::Relaxed),
            duplicates_suppressed: self.duplicates_suppressed.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            listener_panics: self.listener_panics.load(Ordering::Relaxed),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Relaxed),
            sends_dropped: self.sends_dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_counts() {
        let diagnostics = SyncDiagnostics::new();

        diagnostics.record_frame_received();
        diagnostics.record_frame_received();
        diagnostics.record_duplicate_suppressed();
        diagnostics.record_event_delivered();

        let snapshot = diagnostics.snapshot();
        assert_eq!(snapshot.frames_received, 2);
        assert_eq!(snapshot.duplicates_suppressed, 1);
        assert_eq!(snapshot.events_delivered, 1);
        assert_eq!(snapshot.frames_malformed, 0);
    }
}
