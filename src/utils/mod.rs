//! Utility modules shared across the service

pub mod numeric;
pub mod validation;

pub use numeric::round_to_cents;
pub use validation::is_valid_video_id;
