//! Wire messages exchanged with viewer connections

use serde::{Deserialize, Serialize};

/// Event sent by a player over its engagement connection
///
/// Unknown `event` names decode to [`InboundEvent::Unrecognized`] so they can
/// be ignored without being treated as malformed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event")]
pub enum InboundEvent {
    #[serde(rename = "timeupdate")]
    TimeUpdate {
        #[serde(rename = "currentTime")]
        current_time: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    #[serde(other)]
    Unrecognized,
}

impl InboundEvent {
    /// Decode a text frame
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Playback position reduced to the heatmap bucket it falls in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTick {
    pub observed_second: u64,
    pub duration_hint: Option<f64>,
}

impl PlaybackTick {
    /// Build a tick from raw player values.
    ///
    /// Returns `None` for a negative or non-finite position; such events are
    /// dropped as malformed. A non-positive duration is discarded as a hint.
    pub fn from_player(current_time: f64, duration: Option<f64>) -> Option<Self> {
        if !current_time.is_finite() || current_time < 0.0 {
            return None;
        }
        Some(Self {
            observed_second: current_time.floor() as u64,
            duration_hint: duration.filter(|d| d.is_finite() && *d > 0.0),
        })
    }
}

/// Derived statistics pushed to every viewer of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "live_update")]
pub struct LiveUpdate {
    pub total_watch_time: f64,
    pub predicted_revenue: f64,
}
