//! Sync Loop - polls the remote sheet and reconciles the store
//!
//! Two states, Idle and Syncing. On every tick an Idle loop fetches the full
//! remote list and, if it is non-empty, applies it to the store (which
//! persists it). A tick that lands while a fetch is still running is
//! skipped. There is no backoff: a failing remote is simply asked again on
//! the next tick.

use crate::gateway::ReportGateway;
use crate::merge::MergePolicy;
pub use crate::merge::SyncOutcome;
use crate::store::SharedStore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Syncing,
}

pub struct SyncLoop {
    gateway: Arc<dyn ReportGateway>,
    store: SharedStore,
    policy: MergePolicy,
    period: Duration,
    syncing: AtomicBool,
}

/// Puts the loop back to Idle when a cycle ends, however it ends
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncLoop {
    pub fn new(
        gateway: Arc<dyn ReportGateway>,
        store: SharedStore,
        policy: MergePolicy,
        period: Duration,
    ) -> Self {
        Self {
            gateway,
            store,
            policy,
            period,
            syncing: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SyncState {
        if self.syncing.load(Ordering::Acquire) {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// One Idle -> Syncing -> Idle cycle
    pub async fn run_once(&self) -> SyncOutcome {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Sync already in progress, skipping tick");
            return SyncOutcome::Skipped;
        }
        let _guard = CycleGuard(&self.syncing);

        let remote = self.gateway.fetch_all().await;
        if remote.is_empty() {
            debug!("Remote returned no reports, keeping local state");
            return SyncOutcome::NoUpdate;
        }

        let outcome = self.store.write().await.apply_remote(remote, self.policy);
        info!("Sync applied: {:?}", outcome);
        outcome
    }

    /// Tick until `shutdown` flips to true. The first tick fires immediately.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Sync loop started (every {}s, {} policy)", self.period.as_secs(), self.policy);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let this = Arc::clone(&self);
                    // Spawned so a slow fetch cannot delay the next tick; the
                    // next tick then observes Syncing and skips.
                    tokio::spawn(async move {
                        this.run_once().await;
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Sync loop stopped");
    }
}
