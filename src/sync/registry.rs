use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex, PoisonError, Weak},
};

use crate::{diagnostics::SyncDiagnostics, domain::events::InboundEvent};

const LISTENER_PANICKED: &str = "SYNC_LISTENER_PANICKED";

type Handler = Arc<dyn Fn(&InboundEvent) + Send + Sync + 'static>;

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: Vec<(u64, Handler)>,
}

/// Fan-out bus for inbound events.
///
/// Independent features register interest without knowledge of each other.
/// Delivery is synchronous, in subscription order, over a snapshot of the
/// current entries, so a handler may subscribe or unsubscribe (itself
/// included) while a publish is in flight. A panicking handler is isolated
/// and never prevents delivery to the handlers behind it.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    diagnostics: Option<Arc<SyncDiagnostics>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostics(diagnostics: Arc<SyncDiagnostics>) -> Self {
        Self {
            inner: Arc::default(),
            diagnostics: Some(diagnostics),
        }
    }

    /// Registers a handler; the returned handle removes exactly that
    /// handler. The registry holds no owning reference to the feature that
    /// subscribed, so removal must be explicit.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&InboundEvent) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Arc::new(handler)));

        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers the event to every currently registered handler; returns the
    /// number of handlers invoked.
    pub fn publish(&self, event: &InboundEvent) -> usize {
        let snapshot: Vec<(u64, Handler)> = lock(&self.inner).entries.clone();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            // A handler earlier in this publish may have removed this one;
            // firing into a torn-down view would be a stale callback.
            let still_registered = lock(&self.inner)
                .entries
                .iter()
                .any(|(entry_id, _)| *entry_id == id);
            if !still_registered {
                continue;
            }

            delivered += 1;
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                if let Some(diagnostics) = &self.diagnostics {
                    diagnostics.record_listener_panic();
                }
                tracing::warn!(
                    code = LISTENER_PANICKED,
                    listener_id = id,
                    kind = event.kind_label(),
                    "listener panicked during delivery; continuing with remaining listeners"
                );
            }
        }

        delivered
    }

    /// Drops every registration, e.g. on explicit disconnect, so no stale
    /// callback can fire into torn-down features.
    pub fn clear(&self) {
        lock(&self.inner).entries.clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capability to remove one registration. Idempotent; outlives the registry
/// harmlessly.
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<RegistryInner>>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

fn lock(inner: &Mutex<RegistryInner>) -> std::sync::MutexGuard<'_, RegistryInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
