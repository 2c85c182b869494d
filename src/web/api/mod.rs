//! JSON status API

pub mod live_groups;
