use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use crate::{
    api::contracts::PresenceSource,
    diagnostics::{DiagnosticsSnapshot, SyncDiagnostics},
    domain::events::InboundEvent,
    infra::config::AppConfig,
    sync::{
        dispatch::{FrameSink, OutboundDispatcher},
        presence_sync::PresenceReconciler,
        registry::{ListenerRegistry, Subscription},
        status::ConnectionStatusTracker,
        transport::{ConnectError, ConnectionManager},
    },
};

/// Composition root of the synchronization core.
///
/// Wires the transport, the listener registry, the outbound dispatcher and
/// the presence reconciler together, and keeps the internal presence-hint
/// listener registered across connect/disconnect cycles (an explicit
/// disconnect clears the whole registry, this one included).
pub struct SyncService {
    connection: Arc<ConnectionManager>,
    dispatcher: OutboundDispatcher,
    presence: Arc<PresenceReconciler>,
    registry: ListenerRegistry,
    diagnostics: Arc<SyncDiagnostics>,
    presence_listener: Mutex<Option<Subscription>>,
}

impl SyncService {
    pub fn new<S>(config: &AppConfig, presence_source: S) -> Self
    where
        S: PresenceSource + Send + Sync + 'static,
    {
        let diagnostics = Arc::new(SyncDiagnostics::new());
        let registry = ListenerRegistry::with_diagnostics(diagnostics.clone());
        let connection = ConnectionManager::new(
            config.sync.clone(),
            config.server.ws_url.clone(),
            registry.clone(),
            diagnostics.clone(),
        );
        let sink: Arc<dyn FrameSink + Send + Sync> = connection.clone();
        let dispatcher = OutboundDispatcher::new(sink);
        let presence = Arc::new(PresenceReconciler::spawn(
            presence_source,
            Duration::from_millis(config.presence.poll_interval_ms),
        ));

        let service = Self {
            connection,
            dispatcher,
            presence,
            registry,
            diagnostics,
            presence_listener: Mutex::new(None),
        };
        service.ensure_presence_listener();
        service
    }

    /// Opens the live connection for `identity`. Re-registers the internal
    /// presence-hint listener first, so presence keeps converging after a
    /// previous disconnect wiped the registry.
    pub async fn connect(&self, identity: &str) -> Result<(), ConnectError> {
        self.ensure_presence_listener();
        self.connection.connect(identity).await
    }

    /// Tears the connection down and drops every listener registration.
    pub fn disconnect(&self) {
        self.connection.disconnect();
        *self.lock_presence_listener() = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&InboundEvent) + Send + Sync + 'static,
    {
        self.registry.subscribe(handler)
    }

    pub fn dispatcher(&self) -> &OutboundDispatcher {
        &self.dispatcher
    }

    pub fn presence(&self) -> &PresenceReconciler {
        &self.presence
    }

    pub fn status(&self) -> &ConnectionStatusTracker {
        self.connection.status()
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    fn ensure_presence_listener(&self) {
        let mut slot = self.lock_presence_listener();
        if slot.is_some() {
            return;
        }

        let presence = self.presence.clone();
        *slot = Some(self.registry.subscribe(move |event| match event {
            InboundEvent::PresenceJoined { user_id, .. } => presence.on_push_hint(user_id, true),
            InboundEvent::PresenceLeft { user_id, .. } => presence.on_push_hint(user_id, false),
            _ => {}
        }));
    }

    fn lock_presence_listener(&self) -> std::sync::MutexGuard<'_, Option<Subscription>> {
        self.presence_listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::ApiError, domain::presence::PresenceSnapshot};

    /// Presence source that always fails, so push hints are never
    /// overwritten by a poll during the test.
    struct FailingSource;

    impl PresenceSource for FailingSource {
        async fn fetch_online(&self) -> Result<PresenceSnapshot, ApiError> {
            Err(ApiError::Status { status: 503 })
        }
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        // Nothing listens here; connect attempts fail fast.
        config.server.ws_url = "ws://127.0.0.1:1/ws".to_owned();
        config.sync.connect_timeout_ms = 200;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn presence_events_flow_into_the_presence_view() {
        let service = SyncService::new(&test_config(), FailingSource);

        service.registry.publish(&InboundEvent::PresenceJoined {
            user_id: "7".to_owned(),
            timestamp: Some(1.0),
        });

        assert!(service.presence().is_online("7"));

        service.registry.publish(&InboundEvent::PresenceLeft {
            user_id: "7".to_owned(),
            timestamp: Some(2.0),
        });

        assert!(!service.presence().is_online("7"));
    }

    #[tokio::test(start_paused = true)]
    async fn presence_listener_survives_a_disconnect_reconnect_cycle() {
        let service = SyncService::new(&test_config(), FailingSource);

        service.disconnect();
        assert!(service.registry.is_empty());

        // The reconnect attempt fails (nothing is listening) but the
        // internal listener must be re-registered regardless.
        let _ = service.connect("42").await;

        service.registry.publish(&InboundEvent::PresenceJoined {
            user_id: "9".to_owned(),
            timestamp: None,
        });
        assert!(service.presence().is_online("9"));
    }

    #[tokio::test(start_paused = true)]
    async fn chat_send_while_disconnected_is_counted_not_fatal() {
        let service = SyncService::new(&test_config(), FailingSource);

        service.dispatcher().send_chat("hello", "3");

        assert_eq!(service.diagnostics().sends_dropped, 1);
        assert!(!service.is_connected());
    }
}
