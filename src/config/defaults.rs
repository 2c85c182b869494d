/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
use std::time::Duration;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

// Engagement defaults
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_OUTBOUND_BUFFER: usize = 32;

// Predictor defaults (reference revenue model)
pub const DEFAULT_WATCH_TIME_RATE: f64 = 0.015;
pub const DEFAULT_EARLY_VIEW_BONUS: f64 = 0.05;
pub const DEFAULT_EARLY_WINDOW_SECONDS: u64 = 10;

// Configuration sources
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "ENGAGEMENT_";
