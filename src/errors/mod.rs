//! Centralized error handling for the live engagement service
//!
//! # Error Categories
//!
//! - **Store Errors**: aggregate reads and writes against the storage backend
//! - **Session Errors**: invalid lifecycle transitions of a viewer session
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! # Usage
//!
//! ```rust
//! use engagement_live::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for aggregate store Results
pub type StoreResult<T> = Result<T, StoreError>;
