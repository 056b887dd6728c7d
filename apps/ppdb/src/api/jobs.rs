//! # Background Jobs
//!
//! Tokio tasks that advance portal state over time:
//! - the export ticker, one per running export, cancellable through its handle
//! - the announcement sweep, publishing scheduled announcements once due

use super::{AppState, now};
use ppdb_core::Portal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

// =============================================================================
// EXPORT TICKER
// =============================================================================

/// Drive the running export to completion, one tick per `period`.
///
/// Stops by itself once the job completes or is no longer running. The
/// handle is stored on the state so a cancel request can abort it.
///
/// Callers hold the portal write lock across this call, so a ticker is
/// only ever swapped while no other request can start or cancel a job.
/// Lock order is portal, then `export_task`.
pub async fn spawn_export_ticker(state: &AppState) {
    let portal = Arc::clone(&state.portal);
    let period = state.export_tick;

    let handle = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let mut portal = portal.write().await;
            if let Some(outcome) = portal.exports.tick(now()) {
                tracing::info!(
                    event = "export_completed",
                    id = %outcome.value.id,
                    size = %outcome.value.file_size,
                    "Export finished"
                );
                break;
            }
            if !portal.exports.is_running() {
                break;
            }
        }
    });

    let mut slot = state.export_task.lock().await;
    if let Some(previous) = slot.replace(handle) {
        previous.abort();
    }
}

/// Abort the ticker of the current export, if any.
///
/// Same locking rule as [`spawn_export_ticker`]: the caller still holds the
/// portal write lock that saw the job cancelled.
pub async fn abort_export_ticker(state: &AppState) {
    if let Some(handle) = state.export_task.lock().await.take() {
        handle.abort();
    }
}

// =============================================================================
// ANNOUNCEMENT SWEEP
// =============================================================================

/// Publish scheduled announcements whose time has come, every `period`.
pub fn spawn_announcement_sweep(portal: Arc<RwLock<Portal>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let published = portal.write().await.announcements.publish_due(now());
            for id in published {
                tracing::info!(
                    event = "announcement_published",
                    id = %id,
                    "Scheduled announcement published"
                );
            }
        }
    })
}
