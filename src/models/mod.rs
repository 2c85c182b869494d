//! Domain models for live engagement tracking

pub mod engagement_event;
pub mod video_aggregate;

pub use engagement_event::{InboundEvent, LiveUpdate, PlaybackTick};
pub use video_aggregate::{VideoAggregate, WATCH_TIME_UNIT};

use serde::Serialize;

/// Lifecycle of a viewer session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}
