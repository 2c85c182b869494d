use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Live session and broadcast tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Time between two snapshot broadcasts of a session's scheduler
    #[serde(
        with = "duration_serde::duration",
        default = "default_broadcast_interval"
    )]
    pub broadcast_interval: Duration,

    /// Capacity of each session's outbound queue; updates beyond it are dropped
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

/// Coefficients of the revenue predictor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Revenue per unit of watch time
    #[serde(default = "default_watch_time_rate")]
    pub watch_time_rate: f64,
    /// Bonus per view recorded inside the early window
    #[serde(default = "default_early_view_bonus")]
    pub early_view_bonus: f64,
    /// Length of the early window, in seconds from the start of the video
    #[serde(default = "default_early_window_seconds")]
    pub early_window_seconds: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_broadcast_interval() -> Duration {
    DEFAULT_BROADCAST_INTERVAL
}

fn default_outbound_buffer() -> usize {
    DEFAULT_OUTBOUND_BUFFER
}

fn default_watch_time_rate() -> f64 {
    DEFAULT_WATCH_TIME_RATE
}

fn default_early_view_bonus() -> f64 {
    DEFAULT_EARLY_VIEW_BONUS
}

fn default_early_window_seconds() -> u64 {
    DEFAULT_EARLY_WINDOW_SECONDS
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            broadcast_interval: default_broadcast_interval(),
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            watch_time_rate: default_watch_time_rate(),
            early_view_bonus: default_early_view_bonus(),
            early_window_seconds: default_early_window_seconds(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file layered under `ENGAGEMENT_*` variables.
    ///
    /// A missing file is created with the default configuration.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !Path::new(config_file).exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
        }

        let config: Config = Self::base_figment()
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without consulting the environment
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = Self::base_figment()
            .merge(Toml::string(contents))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn base_figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.engagement.broadcast_interval.is_zero() {
            return Err(AppError::configuration(
                "engagement.broadcast_interval must be greater than zero",
            ));
        }
        if self.engagement.outbound_buffer == 0 {
            return Err(AppError::configuration(
                "engagement.outbound_buffer must be at least 1",
            ));
        }
        if self.predictor.watch_time_rate < 0.0 || self.predictor.early_view_bonus < 0.0 {
            return Err(AppError::configuration(
                "predictor rates must not be negative",
            ));
        }
        Ok(())
    }
}
