//! Service layer for live engagement tracking
//!
//! # Architecture
//!
//! - [`AggregateStore`]: per-video counters and heatmap, mutated atomically per video
//! - [`GroupRegistry`]: viewer sessions grouped by video, with non-blocking fan-out
//! - [`Predictor`]: derived revenue score computed from an aggregate snapshot
//! - [`BroadcastScheduler`]: periodic snapshot broadcast owned by one session
//! - [`EngagementSession`]: one viewer's `Connecting -> Active -> Closed` lifecycle
//!
//! [`LiveEngagementService`] wires these together and is shared by every
//! connection handler.

pub mod aggregate_store;
pub mod broadcast_scheduler;
pub mod engagement_session;
pub mod group_registry;
pub mod live_engagement;
pub mod predictor;

pub use aggregate_store::{AggregateStore, InMemoryAggregateStore};
pub use broadcast_scheduler::BroadcastScheduler;
pub use engagement_session::{EngagementSession, EventOutcome};
pub use group_registry::{DeliveryReport, GroupRegistry, GroupSummary, UpdateReceiver, UpdateSender};
pub use live_engagement::LiveEngagementService;
pub use predictor::{Predictor, RevenuePredictor};
