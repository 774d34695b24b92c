use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, time};
use tokio_tungstenite::tungstenite::{self, protocol::Message as WsMessage};

use crate::{
    diagnostics::SyncDiagnostics,
    domain::events::{InboundEvent, OutboundFrame},
    infra::config::SyncConfig,
    sync::{
        dedup::EventDeduplicator,
        dispatch::FrameSink,
        registry::ListenerRegistry,
        status::{ConnectionPhase, ConnectionStatusTracker},
    },
};

const CONNECTED: &str = "SYNC_CONNECTED";
const DISCONNECTED: &str = "SYNC_DISCONNECTED";
const CONNECT_SUPERSEDED: &str = "SYNC_CONNECT_SUPERSEDED";
const FRAME_PARSE_FAILED: &str = "SYNC_FRAME_PARSE_FAILED";
const FRAME_ENCODE_FAILED: &str = "SYNC_FRAME_ENCODE_FAILED";
const DUPLICATE_SUPPRESSED: &str = "SYNC_DUPLICATE_SUPPRESSED";
const SEND_WHILE_DISCONNECTED: &str = "SYNC_SEND_WHILE_DISCONNECTED";
const TRANSPORT_READ_FAILED: &str = "SYNC_TRANSPORT_READ_FAILED";
const RECONNECT_SCHEDULED: &str = "SYNC_RECONNECT_SCHEDULED";
const RECONNECT_ATTEMPT_FAILED: &str = "SYNC_RECONNECT_ATTEMPT_FAILED";
const RECONNECT_RETRIES_EXHAUSTED: &str = "SYNC_RECONNECT_RETRIES_EXHAUSTED";

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("a connection for identity {current} is already open; disconnect first")]
    IdentityConflict { current: String },
    #[error("connect handshake timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport rejected the connection: {0}")]
    Transport(#[from] tungstenite::Error),
}

impl ConnectError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::IdentityConflict { .. } => "SYNC_CONNECT_IDENTITY_CONFLICT",
            Self::Timeout(_) => "SYNC_CONNECT_TIMEOUT",
            Self::Transport(_) => "SYNC_CONNECT_FAILED",
        }
    }
}

/// Owns the one live socket connection per logged-in identity.
///
/// Inbound frames are parsed, gated through the deduplicator, and fanned out
/// through the listener registry. An unexpected close schedules a reconnect
/// with linear backoff; an explicit disconnect tears everything down and
/// schedules nothing. A generation counter ties every spawned task to the
/// connection that created it, so a superseded socket can never leak a
/// delivery.
pub struct ConnectionManager {
    config: SyncConfig,
    ws_base: String,
    registry: ListenerRegistry,
    diagnostics: Arc<SyncDiagnostics>,
    status: ConnectionStatusTracker,
    dedup: Mutex<EventDeduplicator>,
    state: Mutex<ConnState>,
}

#[derive(Default)]
struct ConnState {
    identity: Option<String>,
    generation: u64,
    phase: ConnectionPhase,
    attempts: u32,
    outbound: Option<mpsc::UnboundedSender<OutboundFrame>>,
}

enum LossOutcome {
    GiveUp {
        attempts: u32,
    },
    Retry {
        identity: String,
        attempt: u32,
        delay: Duration,
    },
}

impl ConnectionManager {
    pub fn new(
        config: SyncConfig,
        ws_base: impl Into<String>,
        registry: ListenerRegistry,
        diagnostics: Arc<SyncDiagnostics>,
    ) -> Arc<Self> {
        let dedup = EventDeduplicator::new(config.dedup_window);
        Arc::new(Self {
            config,
            ws_base: ws_base.into(),
            registry,
            diagnostics,
            status: ConnectionStatusTracker::new(),
            dedup: Mutex::new(dedup),
            state: Mutex::new(ConnState::default()),
        })
    }

    /// Opens the live connection for `identity`.
    ///
    /// Fails fast when a connection for a different identity is still
    /// active: two concurrently open sockets would double-deliver events.
    pub async fn connect(self: &Arc<Self>, identity: &str) -> Result<(), ConnectError> {
        let generation = {
            let mut state = self.lock_state();
            if let Some(current) = &state.identity {
                if current != identity && state.phase.is_active() {
                    return Err(ConnectError::IdentityConflict {
                        current: current.clone(),
                    });
                }
                if current == identity && state.phase == ConnectionPhase::Connected {
                    return Ok(());
                }
            }
            state.identity = Some(identity.to_owned());
            state.attempts = 0;
            state.generation += 1;
            state.phase = ConnectionPhase::Connecting;
            state.outbound = None;
            state.generation
        };
        self.status.on_connecting();

        match self.dial(identity, generation).await {
            Ok(()) => Ok(()),
            Err(error) => {
                {
                    let mut state = self.lock_state();
                    if state.generation == generation {
                        state.phase = ConnectionPhase::Disconnected;
                    }
                }
                self.status.on_disconnected(Some(error.code()));
                Err(error)
            }
        }
    }

    /// Explicit teardown: closes the socket cleanly, clears every listener
    /// registration, and schedules no reconnect.
    pub fn disconnect(&self) {
        {
            let mut state = self.lock_state();
            state.generation += 1;
            state.identity = None;
            state.attempts = 0;
            state.phase = ConnectionPhase::Disconnected;
            // Dropping the sender lets the writer task finish with a clean
            // close frame, so the server sees a disconnect, not a timeout.
            state.outbound = None;
        }
        self.registry.clear();
        self.status.on_disconnected(None);
        tracing::info!(code = DISCONNECTED, "connection torn down on request");
    }

    pub fn is_connected(&self) -> bool {
        let state = self.lock_state();
        state.phase == ConnectionPhase::Connected && state.outbound.is_some()
    }

    /// Best-effort send. When the transport is not ready the frame is
    /// dropped with a report; callers treat persistence as a separate path.
    pub fn send(&self, frame: OutboundFrame) {
        {
            let state = self.lock_state();
            if state.phase == ConnectionPhase::Connected {
                if let Some(outbound) = &state.outbound {
                    if outbound.send(frame).is_ok() {
                        return;
                    }
                }
                // Channel gone while phase lagged behind; fall through.
            }
        }
        self.diagnostics.record_send_dropped();
        tracing::warn!(
            code = SEND_WHILE_DISCONNECTED,
            "dropping outbound frame; transport not ready"
        );
    }

    pub fn status(&self) -> &ConnectionStatusTracker {
        &self.status
    }

    async fn dial(self: &Arc<Self>, identity: &str, generation: u64) -> Result<(), ConnectError> {
        let url = format!("{}/{}", self.ws_base.trim_end_matches('/'), identity);
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);

        let handshake = tokio_tungstenite::connect_async(&url);
        let (stream, _response) = match time::timeout(timeout, handshake).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(source)) => return Err(ConnectError::Transport(source)),
            Err(_elapsed) => return Err(ConnectError::Timeout(timeout)),
        };

        let (mut sink, mut stream) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundFrame>();

        {
            let mut state = self.lock_state();
            if state.generation != generation {
                // A disconnect raced the handshake; close the fresh socket
                // instead of keeping a second connection alive.
                tracing::debug!(code = CONNECT_SUPERSEDED, "handshake superseded by teardown");
                tokio::spawn(async move {
                    let _ = sink.send(WsMessage::Close(None)).await;
                });
                return Ok(());
            }
            state.phase = ConnectionPhase::Connected;
            state.attempts = 0;
            state.outbound = Some(out_tx);
        }
        self.status.on_connected();
        tracing::info!(code = CONNECTED, identity, "live connection established");

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(error) => {
                        tracing::warn!(code = FRAME_ENCODE_FAILED, error = %error, "skipping unencodable frame");
                        continue;
                    }
                };
                if sink.send(WsMessage::Text(text)).await.is_err() {
                    return;
                }
            }
            let _ = sink.send(WsMessage::Close(None)).await;
            let _ = sink.close().await;
        });

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(result) = stream.next().await {
                if manager.current_generation() != generation {
                    return;
                }
                match result {
                    Ok(WsMessage::Text(text)) => manager.handle_frame(&text),
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(error) => {
                        tracing::warn!(code = TRANSPORT_READ_FAILED, error = %error, "transport read failed");
                        break;
                    }
                }
            }
            manager.handle_connection_lost(generation);
        });

        Ok(())
    }

    /// One inbound frame: parse, dedup, fan out. A malformed frame is
    /// dropped without terminating the connection.
    fn handle_frame(&self, raw: &str) {
        self.diagnostics.record_frame_received();

        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(error) => {
                self.diagnostics.record_frame_malformed();
                tracing::warn!(
                    code = FRAME_PARSE_FAILED,
                    error = %error,
                    "dropping malformed inbound frame"
                );
                return;
            }
        };

        let fresh = self
            .dedup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_process(&event);
        if !fresh {
            self.diagnostics.record_duplicate_suppressed();
            tracing::debug!(
                code = DUPLICATE_SUPPRESSED,
                kind = event.kind_label(),
                origin = event.origin(),
                "suppressing redelivered event"
            );
            return;
        }

        self.diagnostics.record_event_delivered();
        self.registry.publish(&event);
    }

    fn handle_connection_lost(self: &Arc<Self>, generation: u64) {
        let outcome = {
            let mut state = self.lock_state();
            if state.generation != generation {
                return;
            }
            state.outbound = None;
            state.attempts += 1;
            let attempt = state.attempts;

            match state.identity.clone() {
                Some(identity) if attempt <= self.config.reconnect_max_attempts => {
                    state.phase = ConnectionPhase::Reconnecting;
                    LossOutcome::Retry {
                        identity,
                        attempt,
                        delay: backoff_delay(
                            attempt,
                            Duration::from_millis(self.config.reconnect_base_delay_ms),
                            self.config.reconnect_backoff_cap,
                        ),
                    }
                }
                _ => {
                    state.phase = ConnectionPhase::RetriesExhausted;
                    LossOutcome::GiveUp {
                        attempts: attempt - 1,
                    }
                }
            }
        };

        match outcome {
            LossOutcome::GiveUp { attempts } => {
                self.status.on_retries_exhausted(RECONNECT_RETRIES_EXHAUSTED);
                tracing::warn!(
                    code = RECONNECT_RETRIES_EXHAUSTED,
                    attempts,
                    "automatic reconnection stopped; manual retry required"
                );
            }
            LossOutcome::Retry {
                identity,
                attempt,
                delay,
            } => {
                self.status.on_reconnecting(attempt);
                self.diagnostics.record_reconnect_attempt();
                tracing::info!(
                    code = RECONNECT_SCHEDULED,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "scheduling reconnect after unexpected close"
                );

                let manager = Arc::clone(self);
                tokio::spawn(async move {
                    time::sleep(delay).await;
                    if manager.current_generation() != generation {
                        return;
                    }
                    if let Err(error) = manager.dial(&identity, generation).await {
                        tracing::warn!(
                            code = RECONNECT_ATTEMPT_FAILED,
                            attempt,
                            error = %error,
                            "reconnect attempt failed"
                        );
                        manager.handle_connection_lost(generation);
                    }
                });
            }
        }
    }

    fn current_generation(&self) -> u64 {
        self.lock_state().generation
    }

    fn lock_state(&self) -> MutexGuard<'_, ConnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionPhase {
    fn is_active(self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Connected | Self::Reconnecting
        )
    }
}

impl FrameSink for ConnectionManager {
    fn send_frame(&self, frame: OutboundFrame) {
        self.send(frame);
    }
}

/// Linear backoff: base delay scaled by the attempt count, which stops
/// growing past the cap.
fn backoff_delay(attempt: u32, base: Duration, cap: u32) -> Duration {
    base * attempt.min(cap).max(1)
}
