//! Periodic registry refresh.
//!
//! Each pass asks the source to sync, then feeds the cached text to the
//! snapshot when the source reports a change or nothing has been published
//! yet. Failures are logged and retried on the next tick.
use crate::registry::{ApplyOutcome, RegistrySnapshot, RegistrySource, SyncOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published,
    Unchanged,
    // Nothing cached yet and nothing fetched.
    Empty,
    SourceFailed,
    Rejected,
}

pub async fn refresh_once(source: &dyn RegistrySource, snapshot: &RegistrySnapshot) -> RefreshOutcome {
    let synced = match source.sync().await {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            metrics::counter!("dashboard_registry_sync_failures_total").increment(1);
            tracing::warn!(source = %source.describe(), error = %err, "registry sync failed");
            None
        }
    };

    // After a failed sync, still try the cached copy if nothing is published.
    let needs_load = match synced {
        Some(SyncOutcome::Updated) => true,
        Some(SyncOutcome::Unchanged) | None => !snapshot.is_loaded(),
    };
    if !needs_load {
        return if synced.is_some() {
            RefreshOutcome::Unchanged
        } else {
            RefreshOutcome::SourceFailed
        };
    }

    let text = match source.current_registry_text().await {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::warn!(source = %source.describe(), "no registry available yet");
            return if synced.is_some() {
                RefreshOutcome::Empty
            } else {
                RefreshOutcome::SourceFailed
            };
        }
        Err(err) => {
            tracing::warn!(source = %source.describe(), error = %err, "registry read failed");
            return RefreshOutcome::SourceFailed;
        }
    };

    match snapshot.apply(&text) {
        Ok(ApplyOutcome::Swapped) => RefreshOutcome::Published,
        Ok(ApplyOutcome::Identical) => RefreshOutcome::Unchanged,
        Err(_) => RefreshOutcome::Rejected,
    }
}

/// Run `refresh_once` every `interval`, forever.
///
/// The first pass runs one full period after start; callers perform the
/// initial load themselves. Ticks missed while a slow sync is in flight are
/// delayed rather than bunched up.
pub async fn start_refresh(
    source: Arc<dyn RegistrySource>,
    snapshot: Arc<RegistrySnapshot>,
    interval: Duration,
) {
    tracing::info!(source = %source.describe(), ?interval, "registry refresh started");
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let outcome = refresh_once(source.as_ref(), &snapshot).await;
        tracing::debug!(?outcome, "registry refresh pass complete");
    }
}
