//! HTTP and WebSocket handlers
//!
//! Handlers stay thin: they validate the request at the boundary and hand
//! the work to the service layer.

pub mod engagement;
pub mod health;
