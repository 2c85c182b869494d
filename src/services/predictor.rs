//! Revenue prediction from engagement aggregates
//!
//! The model is a deterministic rule set: a fixed rate per unit of watch time
//! plus a bonus for every view recorded in the opening seconds of the video.

use crate::config::PredictorConfig;
use crate::models::VideoAggregate;
use crate::utils::round_to_cents;

/// Maps an aggregate snapshot to a derived score
pub trait Predictor: Send + Sync {
    /// Score for `snapshot`; an absent snapshot scores zero
    fn predict(&self, snapshot: Option<&VideoAggregate>) -> f64;
}

/// Rule-based revenue predictor
#[derive(Debug, Clone)]
pub struct RevenuePredictor {
    watch_time_rate: f64,
    early_view_bonus: f64,
    early_window_seconds: u64,
}

impl RevenuePredictor {
    pub fn from_config(config: &PredictorConfig) -> Self {
        Self {
            watch_time_rate: config.watch_time_rate,
            early_view_bonus: config.early_view_bonus,
            early_window_seconds: config.early_window_seconds,
        }
    }
}

impl Default for RevenuePredictor {
    fn default() -> Self {
        Self::from_config(&PredictorConfig::default())
    }
}

impl Predictor for RevenuePredictor {
    fn predict(&self, snapshot: Option<&VideoAggregate>) -> f64 {
        let Some(snapshot) = snapshot else {
            return 0.0;
        };

        let base = snapshot.total_watch_time * self.watch_time_rate;
        let bonus: f64 = snapshot
            .heatmap
            .range(0..self.early_window_seconds)
            .map(|(_, views)| *views as f64 * self.early_view_bonus)
            .sum();

        round_to_cents(base + bonus)
    }
}
