//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a driver.
//!
//! # Tasks
//! - Eviction: Removes expired in-memory entries at configured intervals

mod eviction;

pub use eviction::{spawn_eviction_task, sweep_expired, sweep_expired_at};
