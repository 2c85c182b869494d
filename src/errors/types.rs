//! Error type definitions for the live engagement service
//!
//! Errors are layered the same way the service is: storage faults, session
//! lifecycle faults, and the top-level `AppError` that wraps them together
//! with configuration problems.

use thiserror::Error;

use crate::models::SessionState;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Aggregate storage errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Aggregate store errors
///
/// The in-memory store never produces these; they exist for durable storage
/// backends plugged in behind the `AggregateStore` trait. Callers treat every
/// variant as recoverable for the single operation that failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// A stored record could not be decoded
    #[error("Corrupted record for video {video_id}: {message}")]
    CorruptedRecord { video_id: String, message: String },

    /// A write was rejected by the backend
    #[error("Write rejected for video {video_id}: {message}")]
    WriteRejected { video_id: String, message: String },
}

/// Session lifecycle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Attempted a transition the state machine does not allow
    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition { from: SessionState, to: SessionState },
}

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
