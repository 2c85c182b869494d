//! Shared handles for live engagement tracking
//!
//! `LiveEngagementService` bundles the aggregate store, the group registry
//! and the predictor. It is cheap to clone and is what the web layer hands
//! to every viewer connection.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, EngagementConfig};
use crate::services::{
    AggregateStore, BroadcastScheduler, EngagementSession, GroupRegistry, InMemoryAggregateStore,
    Predictor, RevenuePredictor, UpdateReceiver, UpdateSender,
};

#[derive(Clone)]
pub struct LiveEngagementService {
    store: Arc<dyn AggregateStore>,
    registry: Arc<GroupRegistry>,
    predictor: Arc<dyn Predictor>,
    config: EngagementConfig,
    shutdown: CancellationToken,
}

impl LiveEngagementService {
    pub fn new(
        store: Arc<dyn AggregateStore>,
        registry: Arc<GroupRegistry>,
        predictor: Arc<dyn Predictor>,
        config: EngagementConfig,
    ) -> Self {
        Self {
            store,
            registry,
            predictor,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Service with the in-memory store and the configured revenue model
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(InMemoryAggregateStore::new()),
            Arc::new(GroupRegistry::new()),
            Arc::new(RevenuePredictor::from_config(&config.predictor)),
            config.engagement.clone(),
        )
    }

    /// Start a session for a viewer of `video_id`, in the `Connecting` state
    pub fn open_session(&self, video_id: impl Into<String>) -> EngagementSession {
        EngagementSession::new(self.clone(), video_id)
    }

    /// Bounded queue carrying live updates to one session
    pub fn outbound_channel(&self) -> (UpdateSender, UpdateReceiver) {
        mpsc::channel(self.config.outbound_buffer)
    }

    /// Scheduler that broadcasts `video_id`'s updates to its group
    pub fn scheduler_for(&self, video_id: &str) -> BroadcastScheduler {
        BroadcastScheduler::new(
            video_id,
            self.store.clone(),
            self.predictor.clone(),
            self.registry.clone(),
            self.config.broadcast_interval,
        )
    }

    pub fn store(&self) -> &Arc<dyn AggregateStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<GroupRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    /// Token cancelled when the server shuts down; open connections close on it
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Ask every open connection to close
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
