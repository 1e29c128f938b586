//! Background jobs.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use mintbay_market::{collection_stats, collection_summaries};

use crate::metrics::METRICS;
use crate::state::{AppState, Snapshot};

/// Periodically replay the ledger log into the published snapshot until
/// cancelled. Marks the state ready after the first pass.
pub async fn run_refresher(state: Arc<AppState>, cancel: CancellationToken) {
    let mut interval =
        tokio::time::interval(Duration::from_millis(state.config.refresh_interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                refresh_snapshot(&state).await;
                state.ready.store(true, Ordering::Relaxed);
            }
            _ = cancel.cancelled() => {
                info!("Snapshot refresher stopped");
                return;
            }
        }
    }
}

/// One replay pass: rebuild the registry and per-collection trade stats
/// from the recent event window and publish them atomically.
pub async fn refresh_snapshot(state: &AppState) {
    METRICS.refresh_total.fetch_add(1, Ordering::Relaxed);

    let head = state.ledger.head_seq();
    let registry_events = state
        .ledger
        .recent_events(state.config.collection_scan_window);
    let collections = collection_summaries(&registry_events);

    let stats_events = state.ledger.recent_events(state.config.stats_scan_window);
    let mut stats = BTreeMap::new();
    for summary in &collections {
        match collection_stats(&stats_events, &summary.id) {
            Ok(collection) => {
                stats.insert(summary.id.clone(), collection);
            }
            Err(error) => {
                METRICS.refresh_errors.fetch_add(1, Ordering::Relaxed);
                error!(collection = %summary.id, %error, "Stats replay failed");
            }
        }
    }

    debug!(head, collections = collections.len(), "Snapshot refreshed");
    *state.snapshot.write().await = Snapshot {
        head,
        collections,
        stats,
    };
}
