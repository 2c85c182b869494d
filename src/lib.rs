//! Live video engagement tracking
//!
//! Viewers connect over WebSocket to a per-video channel and report playback
//! position. Every video keeps an aggregate of watch time, plays and a
//! per-second heatmap, and every connected viewer periodically receives the
//! video's running totals together with a predicted revenue score.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
pub mod web;
