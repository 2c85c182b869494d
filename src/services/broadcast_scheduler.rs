//! Periodic snapshot broadcaster owned by a viewer session

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::errors::StoreResult;
use crate::models::LiveUpdate;
use crate::services::{AggregateStore, GroupRegistry, Predictor};
use crate::utils::round_to_cents;

/// Recomputes a video's live update on a fixed cadence and fans it out to
/// the video's group until cancelled
pub struct BroadcastScheduler {
    video_id: String,
    store: Arc<dyn AggregateStore>,
    predictor: Arc<dyn Predictor>,
    registry: Arc<GroupRegistry>,
    interval: Duration,
}

impl BroadcastScheduler {
    pub fn new(
        video_id: impl Into<String>,
        store: Arc<dyn AggregateStore>,
        predictor: Arc<dyn Predictor>,
        registry: Arc<GroupRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            store,
            predictor,
            registry,
            interval,
        }
    }

    /// Run the loop on its own task
    pub fn spawn(self, cancellation_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancellation_token).await })
    }

    /// Broadcast every interval until `cancellation_token` fires.
    ///
    /// The first cycle runs one full interval after start.
    pub async fn run(self, cancellation_token: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            video_id = %self.video_id,
            interval = ?self.interval,
            "Broadcast scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => break,
                _ = ticker.tick() => {
                    match self.compute_update().await {
                        Ok(update) => {
                            // Cancellation may land while the store read is in flight
                            if cancellation_token.is_cancelled() {
                                break;
                            }
                            let report = self.registry.broadcast(&self.video_id, Arc::new(update));
                            trace!(
                                video_id = %self.video_id,
                                delivered = report.delivered,
                                dropped = report.dropped,
                                closed = report.closed,
                                "Live update broadcast"
                            );
                        }
                        Err(e) => {
                            warn!(
                                video_id = %self.video_id,
                                "Skipping broadcast cycle, aggregate read failed: {}",
                                e
                            );
                        }
                    }
                }
            }
        }

        debug!(video_id = %self.video_id, "Broadcast scheduler stopped");
    }

    /// Build the update for the current aggregate; an unknown video yields zeros
    pub async fn compute_update(&self) -> StoreResult<LiveUpdate> {
        let snapshot = self.store.read_snapshot(&self.video_id).await?;
        let total_watch_time = snapshot
            .as_ref()
            .map(|aggregate| aggregate.total_watch_time)
            .unwrap_or(0.0);

        Ok(LiveUpdate {
            total_watch_time: round_to_cents(total_watch_time),
            predicted_revenue: self.predictor.predict(snapshot.as_ref()),
        })
    }
}
