//! Per-video engagement aggregate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Watch time credited for every qualifying playback event.
///
/// Clients emit `timeupdate` at a roughly fixed cadence, so one event is
/// counted as one unit of watch time rather than the measured elapsed time.
pub const WATCH_TIME_UNIT: f64 = 1.0;

/// Accumulated engagement statistics for one video
///
/// Heatmap keys serialize as strings (`{"0": 2, "15": 3}`), which is the
/// record layout durable storage backends exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAggregate {
    pub video_id: String,
    /// Video length in seconds, set once by the first positive report
    pub duration: Option<f64>,
    pub total_watch_time: f64,
    pub play_count: u64,
    pub engagement_event_count: u64,
    /// Second of the timeline -> number of events observed at that second
    pub heatmap: BTreeMap<u64, u64>,
}

impl VideoAggregate {
    /// Create a zero-valued aggregate
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            duration: None,
            total_watch_time: 0.0,
            play_count: 0,
            engagement_event_count: 0,
            heatmap: BTreeMap::new(),
        }
    }

    /// Apply one playback event at `observed_second`
    pub fn record_event(&mut self, observed_second: u64, duration_hint: Option<f64>) {
        if let Some(hint) = duration_hint {
            self.set_duration_once(hint);
        }
        self.total_watch_time += WATCH_TIME_UNIT;
        self.engagement_event_count += 1;
        *self.heatmap.entry(observed_second).or_insert(0) += 1;
    }

    /// Count a new playback session
    pub fn record_play(&mut self) {
        self.play_count += 1;
    }

    /// Set the duration if it is still unset and `hint` is a positive length.
    ///
    /// Returns true when the duration was written.
    pub fn set_duration_once(&mut self, hint: f64) -> bool {
        if self.duration.is_some() || !hint.is_finite() || hint <= 0.0 {
            return false;
        }
        self.duration = Some(hint);
        true
    }

    /// Events observed at a given second
    pub fn heatmap_count(&self, second: u64) -> u64 {
        self.heatmap.get(&second).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_aggregate_is_zero_valued() {
        let aggregate = VideoAggregate::new("abc-123");
        assert_eq!(aggregate.video_id, "abc-123");
        assert_eq!(aggregate.duration, None);
        assert_eq!(aggregate.total_watch_time, 0.0);
        assert_eq!(aggregate.play_count, 0);
        assert_eq!(aggregate.engagement_event_count, 0);
        assert!(aggregate.heatmap.is_empty());
    }

    #[test]
    fn test_record_event_updates_all_counters() {
        let mut aggregate = VideoAggregate::new("v");
        aggregate.record_event(4, Some(120.0));
        aggregate.record_event(4, None);
        aggregate.record_event(9, None);

        assert_eq!(aggregate.total_watch_time, 3.0 * WATCH_TIME_UNIT);
        assert_eq!(aggregate.engagement_event_count, 3);
        assert_eq!(aggregate.heatmap_count(4), 2);
        assert_eq!(aggregate.heatmap_count(9), 1);
        assert_eq!(aggregate.heatmap_count(5), 0);
        assert_eq!(aggregate.duration, Some(120.0));
    }

    #[test]
    fn test_duration_first_positive_value_wins() {
        let mut aggregate = VideoAggregate::new("v");
        assert!(!aggregate.set_duration_once(0.0));
        assert!(!aggregate.set_duration_once(-3.0));
        assert!(!aggregate.set_duration_once(f64::NAN));
        assert!(aggregate.set_duration_once(61.5));
        assert!(!aggregate.set_duration_once(90.0));
        assert_eq!(aggregate.duration, Some(61.5));
    }

    #[test]
    fn test_heatmap_serializes_with_string_keys() {
        let mut aggregate = VideoAggregate::new("v");
        aggregate.record_event(0, None);
        aggregate.record_event(15, None);

        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["heatmap"]["0"], 1);
        assert_eq!(json["heatmap"]["15"], 1);

        let decoded: VideoAggregate = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, aggregate);
    }
}
