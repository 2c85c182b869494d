//! Viewer session lifecycle
//!
//! A session moves `Connecting -> Active -> Closed`. Activation joins the
//! video's group, counts the play and starts the session's broadcast
//! scheduler. Closing stops that scheduler, waits for it to finish and
//! leaves the group; nothing the session started outlives it.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{AppResult, SessionError};
use crate::models::{InboundEvent, PlaybackTick, SessionState};
use crate::services::{LiveEngagementService, UpdateSender};

/// What became of one inbound text frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventOutcome {
    /// Recorded against the video's aggregate
    Applied,
    /// Valid JSON with an event name the service does not handle
    Unrecognized,
    /// Not decodable, or carrying an unusable playback position
    Malformed,
    /// The store rejected the write; the session carries on
    StoreFailed,
    /// The session is not active
    NotActive,
}

struct RunningBroadcast {
    cancellation_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// One viewer connection's engagement state
pub struct EngagementSession {
    session_id: Uuid,
    video_id: String,
    state: SessionState,
    service: LiveEngagementService,
    broadcast: Option<RunningBroadcast>,
}

impl EngagementSession {
    pub fn new(service: LiveEngagementService, video_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            video_id: video_id.into(),
            state: SessionState::Connecting,
            service,
            broadcast: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.session_id
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Accept the viewer and start live updates towards `outbound`
    ///
    /// A play count failure is logged and does not prevent activation.
    pub async fn activate(&mut self, outbound: UpdateSender) -> AppResult<()> {
        if self.state != SessionState::Connecting {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: SessionState::Active,
            }
            .into());
        }

        self.service
            .registry()
            .join(&self.video_id, self.session_id, outbound);

        if let Err(e) = self.service.store().increment_play_count(&self.video_id).await {
            warn!(
                video_id = %self.video_id,
                session_id = %self.session_id,
                "Failed to record play: {}",
                e
            );
        }

        let cancellation_token = CancellationToken::new();
        let handle = self
            .service
            .scheduler_for(&self.video_id)
            .spawn(cancellation_token.clone());
        self.broadcast = Some(RunningBroadcast {
            cancellation_token,
            handle,
        });
        self.state = SessionState::Active;

        info!(
            video_id = %self.video_id,
            session_id = %self.session_id,
            "Viewer session active"
        );
        Ok(())
    }

    /// Process one inbound text frame
    pub async fn handle_text(&mut self, raw: &str) -> EventOutcome {
        if self.state != SessionState::Active {
            return EventOutcome::NotActive;
        }

        let (current_time, duration) = match InboundEvent::parse(raw) {
            Ok(InboundEvent::TimeUpdate {
                current_time,
                duration,
            }) => (current_time, duration),
            Ok(InboundEvent::Unrecognized) => {
                debug!(session_id = %self.session_id, "Ignoring unrecognized event");
                return EventOutcome::Unrecognized;
            }
            Err(e) => {
                debug!(session_id = %self.session_id, "Ignoring malformed event: {}", e);
                return EventOutcome::Malformed;
            }
        };

        let Some(tick) = PlaybackTick::from_player(current_time, duration) else {
            debug!(
                session_id = %self.session_id,
                current_time,
                "Ignoring event with unusable playback position"
            );
            return EventOutcome::Malformed;
        };

        match self
            .service
            .store()
            .apply_event(&self.video_id, tick.observed_second, tick.duration_hint)
            .await
        {
            Ok(()) => EventOutcome::Applied,
            Err(e) => {
                warn!(
                    video_id = %self.video_id,
                    session_id = %self.session_id,
                    "Failed to record playback event: {}",
                    e
                );
                EventOutcome::StoreFailed
            }
        }
    }

    /// Stop live updates and leave the group. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Some(broadcast) = self.broadcast.take() {
            broadcast.cancellation_token.cancel();
            if let Err(e) = broadcast.handle.await {
                warn!(session_id = %self.session_id, "Broadcast task ended abnormally: {}", e);
            }
        }
        self.service
            .registry()
            .leave(&self.video_id, self.session_id);

        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        info!(
            video_id = %self.video_id,
            session_id = %self.session_id,
            from = %previous,
            "Viewer session closed"
        );
    }
}

impl Drop for EngagementSession {
    // A session dropped without `close` still must not leave a scheduler running
    fn drop(&mut self) {
        if let Some(broadcast) = self.broadcast.take() {
            broadcast.cancellation_token.cancel();
            self.service
                .registry()
                .leave(&self.video_id, self.session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngagementConfig;
    use crate::errors::{AppError, StoreError};
    use crate::services::aggregate_store::MockAggregateStore;
    use crate::services::{
        AggregateStore, GroupRegistry, InMemoryAggregateStore, RevenuePredictor,
    };
    use rstest::rstest;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing_test::traced_test;

    const INTERVAL: Duration = Duration::from_secs(2);

    fn service_with(store: Arc<dyn AggregateStore>) -> LiveEngagementService {
        LiveEngagementService::new(
            store,
            Arc::new(GroupRegistry::new()),
            Arc::new(RevenuePredictor::default()),
            EngagementConfig {
                broadcast_interval: INTERVAL,
                outbound_buffer: 8,
            },
        )
    }

    fn service() -> LiveEngagementService {
        service_with(Arc::new(InMemoryAggregateStore::new()))
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let service = service();
        let mut session = service.open_session("v");
        assert_eq!(session.state(), SessionState::Connecting);

        let (tx, _rx) = service.outbound_channel();
        session.activate(tx).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(service.registry().session_count("v"), 1);

        let (tx, _rx) = service.outbound_channel();
        let err = session.activate(tx).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Session(SessionError::InvalidTransition {
                from: SessionState::Active,
                to: SessionState::Active
            })
        ));

        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(service.registry().session_count("v"), 0);

        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);

        let (tx, _rx) = service.outbound_channel();
        assert!(session.activate(tx).await.is_err(), "closed is terminal");
    }

    #[tokio::test]
    async fn test_close_before_activation() {
        let service = service();
        let mut session = service.open_session("v");
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(service.registry().group_count(), 0);
    }

    #[tokio::test]
    async fn test_activation_counts_one_play_per_session() {
        let service = service();
        let mut first = service.open_session("v");
        let mut second = service.open_session("v");
        let (tx1, _rx1) = service.outbound_channel();
        let (tx2, _rx2) = service.outbound_channel();
        first.activate(tx1).await.unwrap();
        second.activate(tx2).await.unwrap();

        let snapshot = service.store().read_snapshot("v").await.unwrap().unwrap();
        assert_eq!(snapshot.play_count, 2);

        first.close().await;
        second.close().await;
    }

    #[rstest]
    #[case(r#"{"event":"timeupdate","currentTime":4.9}"#, EventOutcome::Applied)]
    #[case(r#"{"event":"timeupdate","currentTime":0,"duration":12.5}"#, EventOutcome::Applied)]
    #[case(r#"{"event":"pause","currentTime":4}"#, EventOutcome::Unrecognized)]
    #[case(r#"{"event":"timeupdate"}"#, EventOutcome::Malformed)]
    #[case(r#"{"event":"timeupdate","currentTime":-1}"#, EventOutcome::Malformed)]
    #[case(r#"{"event":"timeupdate","currentTime":"soon"}"#, EventOutcome::Malformed)]
    #[case("not json", EventOutcome::Malformed)]
    #[tokio::test]
    async fn test_inbound_frames(#[case] raw: &str, #[case] expected: EventOutcome) {
        let service = service();
        let mut session = service.open_session("v");
        let (tx, _rx) = service.outbound_channel();
        session.activate(tx).await.unwrap();

        assert_eq!(session.handle_text(raw).await, expected);

        let snapshot = service.store().read_snapshot("v").await.unwrap().unwrap();
        let expected_events = u64::from(expected == EventOutcome::Applied);
        assert_eq!(snapshot.engagement_event_count, expected_events);
        assert_eq!(session.state(), SessionState::Active);
        session.close().await;
    }

    #[tokio::test]
    async fn test_applied_event_updates_heatmap_bucket() {
        let service = service();
        let mut session = service.open_session("v");
        let (tx, _rx) = service.outbound_channel();
        session.activate(tx).await.unwrap();

        session
            .handle_text(r#"{"event":"timeupdate","currentTime":4.9,"duration":60}"#)
            .await;
        session
            .handle_text(r#"{"event":"timeupdate","currentTime":4.1}"#)
            .await;

        let snapshot = service.store().read_snapshot("v").await.unwrap().unwrap();
        assert_eq!(snapshot.heatmap_count(4), 2);
        assert_eq!(snapshot.total_watch_time, 2.0);
        assert_eq!(snapshot.duration, Some(60.0));
        session.close().await;
    }

    #[tokio::test]
    async fn test_events_ignored_unless_active() {
        let service = service();
        let mut session = service.open_session("v");
        let frame = r#"{"event":"timeupdate","currentTime":1}"#;

        assert_eq!(session.handle_text(frame).await, EventOutcome::NotActive);

        let (tx, _rx) = service.outbound_channel();
        session.activate(tx).await.unwrap();
        session.close().await;
        assert_eq!(session.handle_text(frame).await, EventOutcome::NotActive);

        let snapshot = service.store().read_snapshot("v").await.unwrap().unwrap();
        assert_eq!(snapshot.engagement_event_count, 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_store_failures_do_not_end_session() {
        let mut store = MockAggregateStore::new();
        store
            .expect_increment_play_count()
            .returning(|_| Err(StoreError::unavailable("database down")));
        store.expect_apply_event().returning(|video_id, _, _| {
            Err(StoreError::WriteRejected {
                video_id: video_id.to_string(),
                message: "read only".to_string(),
            })
        });
        store.expect_read_snapshot().returning(|_| Ok(None));

        let service = service_with(Arc::new(store));
        let mut session = service.open_session("v");
        let (tx, _rx) = service.outbound_channel();
        session.activate(tx).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);

        assert_eq!(
            session
                .handle_text(r#"{"event":"timeupdate","currentTime":3}"#)
                .await,
            EventOutcome::StoreFailed
        );
        assert_eq!(session.state(), SessionState::Active);
        assert!(logs_contain("Failed to record play"));
        assert!(logs_contain("Failed to record playback event"));
        session.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_one_viewer_keeps_the_other_updated() {
        let service = service();
        let mut leaving = service.open_session("v");
        let mut staying = service.open_session("v");
        let (leaving_tx, mut leaving_rx) = service.outbound_channel();
        let (staying_tx, mut staying_rx) = service.outbound_channel();
        leaving.activate(leaving_tx).await.unwrap();
        staying.activate(staying_tx).await.unwrap();

        staying
            .handle_text(r#"{"event":"timeupdate","currentTime":2}"#)
            .await;

        // Two schedulers, one update each per cycle to both viewers
        tokio::time::sleep(INTERVAL + INTERVAL / 2).await;
        assert_eq!(leaving_rx.try_recv().unwrap().total_watch_time, 1.0);
        assert_eq!(staying_rx.try_recv().unwrap().total_watch_time, 1.0);
        while staying_rx.try_recv().is_ok() {}

        leaving.close().await;
        assert_eq!(service.registry().session_count("v"), 1);

        tokio::time::sleep(INTERVAL).await;
        assert_eq!(
            staying_rx.try_recv().unwrap().total_watch_time,
            1.0,
            "remaining viewer still receives updates"
        );
        assert!(
            staying_rx.try_recv().is_err(),
            "closed session's scheduler no longer broadcasts"
        );
        // The registry dropped the closed session's sender
        while leaving_rx.try_recv().is_ok() {}
        assert!(leaving_rx.recv().await.is_none());

        staying.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_session_stops_its_scheduler() {
        let service = service();
        let (tx, mut rx) = service.outbound_channel();
        {
            let mut session = service.open_session("v");
            session.activate(tx).await.unwrap();
        }
        assert_eq!(service.registry().session_count("v"), 0);

        tokio::time::sleep(INTERVAL * 3).await;
        assert!(rx.recv().await.is_none());
    }
}
