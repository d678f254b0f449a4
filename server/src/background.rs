use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, info_span, Instrument};

use crate::services::{ChangeListener, EngagementReconciler, EventStore};

/// Keeps the event store current: refreshes on every "events changed"
/// notification and on a fixed interval, then evicts idle engagement slots.
/// Returns once every notifier has been dropped.
pub async fn start_refresh_worker(
    store: Arc<EventStore>,
    engagement: Arc<EngagementReconciler>,
    mut listener: ChangeListener,
    period: Duration,
) {
    info!(period_secs = period.as_secs(), "Starting event refresh worker...");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; startup already loaded the list.
    ticker.tick().await;

    loop {
        let trigger = tokio::select! {
            _ = ticker.tick() => "interval",
            changed = listener.changed() => match changed {
                Some(()) => "change",
                None => break,
            },
        };

        let span = info_span!("event_refresh", trigger);
        async {
            if store.refresh().await {
                engagement.evict_idle();
            } else {
                debug!(trigger, "Refresh skipped, serving the previous list");
            }
        }
        .instrument(span)
        .await;
    }

    info!("Event refresh worker stopped");
}
