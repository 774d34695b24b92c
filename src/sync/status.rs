use std::{
    sync::{mpsc, Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};

/// Lifecycle phase of the live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Disconnected,
    /// Backoff budget spent; nothing happens until a manual retry.
    RetriesExhausted,
}

impl ConnectionPhase {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Idle => "CONNECTION_IDLE",
            Self::Connecting => "CONNECTION_CONNECTING",
            Self::Connected => "CONNECTION_CONNECTED",
            Self::Reconnecting => "CONNECTION_RECONNECTING",
            Self::Disconnected => "CONNECTION_DISCONNECTED",
            Self::RetriesExhausted => "CONNECTION_RETRIES_EXHAUSTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub code: String,
    pub at_unix_ms: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub phase: ConnectionPhase,
    pub attempt: u32,
    pub updated_at_unix_ms: u128,
    pub last_error: Option<StatusError>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            phase: ConnectionPhase::Idle,
            attempt: 0,
            updated_at_unix_ms: now_unix_ms(),
            last_error: None,
        }
    }
}

/// Publishes connection lifecycle transitions to interested observers.
///
/// Sustained failure is the only state worth surfacing to the user; the
/// tracker carries enough detail for a "disconnected" indicator without the
/// observer having to watch the transport itself.
#[derive(Clone, Debug, Default)]
pub struct ConnectionStatusTracker {
    inner: Arc<Mutex<TrackerState>>,
}

#[derive(Debug, Default)]
struct TrackerState {
    snapshot: ConnectionStatus,
    subscribers: Vec<mpsc::Sender<ConnectionStatus>>,
}

impl ConnectionStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::Receiver<ConnectionStatus> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut state) = self.inner.lock() {
            let _ = tx.send(state.snapshot.clone());
            state.subscribers.push(tx);
        }
        rx
    }

    pub fn snapshot(&self) -> ConnectionStatus {
        self.inner
            .lock()
            .map(|state| state.snapshot.clone())
            .unwrap_or_default()
    }

    pub fn on_connecting(&self) {
        self.mutate(|snapshot| {
            snapshot.phase = ConnectionPhase::Connecting;
            snapshot.attempt = 0;
            snapshot.last_error = None;
        });
    }

    pub fn on_connected(&self) {
        self.mutate(|snapshot| {
            snapshot.phase = ConnectionPhase::Connected;
            snapshot.attempt = 0;
            snapshot.last_error = None;
        });
    }

    pub fn on_reconnecting(&self, attempt: u32) {
        self.mutate(|snapshot| {
            snapshot.phase = ConnectionPhase::Reconnecting;
            snapshot.attempt = attempt;
        });
    }

    pub fn on_disconnected(&self, error_code: Option<&str>) {
        self.mutate(|snapshot| {
            snapshot.phase = ConnectionPhase::Disconnected;
            snapshot.last_error = error_code.map(|code| StatusError {
                code: code.to_owned(),
                at_unix_ms: now_unix_ms(),
            });
        });
    }

    pub fn on_retries_exhausted(&self, error_code: &str) {
        self.mutate(|snapshot| {
            snapshot.phase = ConnectionPhase::RetriesExhausted;
            snapshot.last_error = Some(StatusError {
                code: error_code.to_owned(),
                at_unix_ms: now_unix_ms(),
            });
        });
    }

    fn mutate<F>(&self, mutator: F)
    where
        F: FnOnce(&mut ConnectionStatus),
    {
        if let Ok(mut state) = self.inner.lock() {
            mutator(&mut state.snapshot);
            state.snapshot.updated_at_unix_ms = now_unix_ms();
            let payload = state.snapshot.clone();
            state
                .subscribers
                .retain(|sub| sub.send(payload.clone()).is_ok());
        }
    }
}

pub fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_initial_snapshot_on_subscribe() {
        let tracker = ConnectionStatusTracker::new();
        let rx = tracker.subscribe();

        let initial = rx.recv().expect("initial snapshot should be sent");
        assert_eq!(initial.phase, ConnectionPhase::Idle);
        assert_eq!(initial.last_error, None);
    }

    #[test]
    fn connected_clears_attempts_and_last_error() {
        let tracker = ConnectionStatusTracker::new();
        tracker.on_disconnected(Some("SYNC_CONNECT_FAILED"));
        tracker.on_reconnecting(3);

        tracker.on_connected();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.phase, ConnectionPhase::Connected);
        assert_eq!(snapshot.attempt, 0);
        assert!(snapshot.last_error.is_none());
    }

    #[test]
    fn retries_exhausted_records_error_code() {
        let tracker = ConnectionStatusTracker::new();

        tracker.on_retries_exhausted("SYNC_RECONNECT_RETRIES_EXHAUSTED");

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.phase, ConnectionPhase::RetriesExhausted);
        assert_eq!(
            snapshot.last_error.as_ref().map(|e| e.code.as_str()),
            Some("SYNC_RECONNECT_RETRIES_EXHAUSTED")
        );
        assert!(snapshot.updated_at_unix_ms > 0);
    }

    #[test]
    fn subscribers_observe_transitions_in_order() {
        let tracker = ConnectionStatusTracker::new();
        let rx = tracker.subscribe();
        let _initial = rx.recv().expect("initial snapshot");

        tracker.on_connecting();
        tracker.on_connected();
        tracker.on_reconnecting(1);

        let phases: Vec<ConnectionPhase> = rx.try_iter().map(|status| status.phase).collect();
        assert_eq!(
            phases,
            vec![
                ConnectionPhase::Connecting,
                ConnectionPhase::Connected,
                ConnectionPhase::Reconnecting,
            ]
        );
    }
}
