//! Aggregate store
//!
//! Holds one [`VideoAggregate`] per video. Every mutation for a video is
//! applied while holding that entry's shard lock, so concurrent increments
//! from different sessions are never lost, and videos living in different
//! shards never wait on each other.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use crate::errors::StoreResult;
use crate::models::VideoAggregate;

/// Storage contract for per-video engagement aggregates
///
/// Durable backends implement this trait; failures are reported as
/// [`crate::errors::StoreError`] and callers abandon only the failing call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Fetch the aggregate, creating a zero-valued record on first access
    async fn get_or_create(&self, video_id: &str) -> StoreResult<VideoAggregate>;

    /// Record one playback event observed at `observed_second`
    async fn apply_event(
        &self,
        video_id: &str,
        observed_second: u64,
        duration_hint: Option<f64>,
    ) -> StoreResult<()>;

    /// Count one new playback session
    async fn increment_play_count(&self, video_id: &str) -> StoreResult<()>;

    /// Copy of the current aggregate, if the video has ever been touched
    async fn read_snapshot(&self, video_id: &str) -> StoreResult<Option<VideoAggregate>>;

    /// Register a record supplied by an ingestion collaborator.
    ///
    /// Called by whatever imports video metadata (uploads, catalogue sync)
    /// before viewers connect; the live path never calls it. An existing
    /// record keeps its counters; only an unset duration is filled.
    async fn seed(&self, aggregate: VideoAggregate) -> StoreResult<()>;

    /// Number of videos with a record
    async fn video_count(&self) -> StoreResult<usize>;
}

/// In-process aggregate store backed by a sharded concurrent map
#[derive(Debug, Default)]
pub struct InMemoryAggregateStore {
    records: DashMap<String, VideoAggregate>,
}

impl InMemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AggregateStore for InMemoryAggregateStore {
    async fn get_or_create(&self, video_id: &str) -> StoreResult<VideoAggregate> {
        let record = self
            .records
            .entry(video_id.to_string())
            .or_insert_with(|| VideoAggregate::new(video_id));
        Ok(record.clone())
    }

    async fn apply_event(
        &self,
        video_id: &str,
        observed_second: u64,
        duration_hint: Option<f64>,
    ) -> StoreResult<()> {
        let mut record = self
            .records
            .entry(video_id.to_string())
            .or_insert_with(|| VideoAggregate::new(video_id));
        record.record_event(observed_second, duration_hint);
        trace!(
            video_id = %video_id,
            observed_second,
            events = record.engagement_event_count,
            "Applied playback event"
        );
        Ok(())
    }

    async fn increment_play_count(&self, video_id: &str) -> StoreResult<()> {
        self.records
            .entry(video_id.to_string())
            .or_insert_with(|| VideoAggregate::new(video_id))
            .record_play();
        Ok(())
    }

    async fn read_snapshot(&self, video_id: &str) -> StoreResult<Option<VideoAggregate>> {
        Ok(self.records.get(video_id).map(|record| record.clone()))
    }

    async fn seed(&self, aggregate: VideoAggregate) -> StoreResult<()> {
        let duration = aggregate.duration;
        let mut record = self
            .records
            .entry(aggregate.video_id.clone())
            .or_insert(aggregate);
        if let Some(duration) = duration {
            record.set_duration_once(duration);
        }
        Ok(())
    }

    async fn video_count(&self) -> StoreResult<usize> {
        Ok(self.records.len())
    }
}
