use std::{
    path::Path,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use anyhow::Result;
use tokio::sync::mpsc;

use crate::{
    api::{self, client::HttpApiClient, contracts::ChannelMessagesSource},
    cli::{Cli, Command},
    domain, infra,
    sync::{
        self,
        policy::{ReconcileAction, ReconcilePolicy},
        service::SyncService,
    },
    usecases::{self, bootstrap},
};

const CHANNEL_REFRESH_FAILED: &str = "APP_CHANNEL_REFRESH_FAILED";

pub async fn run(cli: Cli) -> Result<()> {
    tracing::debug!(
        domain = domain::module_name(),
        sync = sync::module_name(),
        api = api::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    match cli.command {
        Command::Run { identity, channel } => {
            run_sync(cli.config.as_deref(), &identity, channel).await
        }
    }
}

async fn run_sync(
    config_path: Option<&Path>,
    identity: &str,
    active_channel: Option<String>,
) -> Result<()> {
    let context = bootstrap::bootstrap(config_path)?;
    let api = Arc::new(HttpApiClient::new(
        context.config.server.api_url.clone(),
        context.config.server.auth_token.clone(),
    ));
    let service = SyncService::new(&context.config, (*api).clone());

    let _log_subscription = service.subscribe(|event| {
        tracing::info!(
            kind = event.kind_label(),
            origin = event.origin(),
            channel_id = event.channel_id(),
            "event received"
        );
    });

    let policy = Arc::new(Mutex::new(ReconcilePolicy::new(
        identity,
        Duration::from_millis(context.config.sync.typing_ttl_ms),
    )));
    let (refetch_tx, mut refetch_rx) = mpsc::unbounded_channel::<String>();
    let policy_clone = policy.clone();
    let _reconcile_subscription = service.subscribe(move |event| {
        let action = policy_clone
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(event, active_channel.as_deref(), Instant::now());
        if let ReconcileAction::RefetchChannel(channel_id) = action {
            let _ = refetch_tx.send(channel_id);
        }
    });

    service.connect(identity).await?;
    tracing::info!(identity, "synchronization running; press Ctrl-C to stop");

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            Some(channel_id) = refetch_rx.recv() => {
                refresh_channel(api.as_ref(), &channel_id).await;
            }
        }
    }

    service.disconnect();

    let stats = service.diagnostics();
    tracing::info!(
        frames_received = stats.frames_received,
        frames_malformed = stats.frames_malformed,
        duplicates_suppressed = stats.duplicates_suppressed,
        events_delivered = stats.events_delivered,
        listener_panics = stats.listener_panics,
        reconnect_attempts = stats.reconnect_attempts,
        sends_dropped = stats.sends_dropped,
        "synchronization stopped"
    );

    Ok(())
}

/// Re-reads the channel's authoritative message list after remote activity.
/// A failed refresh leaves the stale list in place; the next remote event
/// triggers another attempt.
async fn refresh_channel(api: &HttpApiClient, channel_id: &str) {
    match api.fetch_channel_messages(channel_id).await {
        Ok(messages) => {
            tracing::info!(
                channel_id,
                count = messages.len(),
                "channel refreshed from authoritative state"
            );
        }
        Err(error) => {
            tracing::warn!(
                code = CHANNEL_REFRESH_FAILED,
                channel_id,
                error = %error,
                "channel refresh failed; keeping stale list"
            );
        }
    }
}
