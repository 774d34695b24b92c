use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::{
    api::contracts::PresenceSource,
    domain::presence::{PresenceSnapshot, PresenceView},
};

const PRESENCE_POLL_FAILED: &str = "SYNC_PRESENCE_POLL_FAILED";

/// Merges push-derived presence hints with periodic authoritative polls.
///
/// Hints update the view immediately for responsiveness but are
/// provisional: each one also pokes an out-of-band poll, and every poll
/// replaces the view wholesale because the poll is ground truth. A failed
/// poll keeps the previous (stale but available) view and is retried on the
/// next interval.
pub struct PresenceReconciler {
    view: Arc<Mutex<PresenceView>>,
    poke_tx: mpsc::UnboundedSender<()>,
}

impl PresenceReconciler {
    /// Spawns the poll loop against the authoritative source.
    pub fn spawn<S>(source: S, poll_interval: Duration) -> Self
    where
        S: PresenceSource + Send + Sync + 'static,
    {
        let view = Arc::new(Mutex::new(PresenceView::new()));
        let (poke_tx, poke_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_poll_loop(source, Arc::clone(&view), poll_interval, poke_rx));

        Self { view, poke_tx }
    }

    /// Applies a connection-derived hint and requests an immediate
    /// authoritative poll, since hints can race with the regular interval.
    pub fn on_push_hint(&self, user_id: &str, is_online: bool) {
        self.lock_view().apply_hint(user_id, is_online, Utc::now());
        let _ = self.poke_tx.send(());
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.lock_view().is_online(user_id)
    }

    pub fn online_count(&self) -> usize {
        self.lock_view().online_count()
    }

    pub fn last_seen(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.lock_view().last_seen(user_id)
    }

    fn lock_view(&self) -> std::sync::MutexGuard<'_, PresenceView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run_poll_loop<S>(
    source: S,
    view: Arc<Mutex<PresenceView>>,
    poll_interval: Duration,
    mut poke_rx: mpsc::UnboundedReceiver<()>,
) where
    S: PresenceSource,
{
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            poke = poke_rx.recv() => {
                if poke.is_none() {
                    // Reconciler dropped; stop polling.
                    return;
                }
                ticker.reset();
            }
        }

        poll_once(&source, &view).await;
    }
}

async fn poll_once<S>(source: &S, view: &Arc<Mutex<PresenceView>>)
where
    S: PresenceSource,
{
    match source.fetch_online().await {
        Ok(snapshot) => apply_snapshot(view, &snapshot),
        Err(error) => {
            tracing::warn!(
                code = PRESENCE_POLL_FAILED,
                error = %error,
                "presence poll failed; keeping previous view until next interval"
            );
        }
    }
}

fn apply_snapshot(view: &Arc<Mutex<PresenceView>>, snapshot: &PresenceSnapshot) {
    view.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(snapshot, Utc::now());
}
