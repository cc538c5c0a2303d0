//! Background Tasks Module
//!
//! Contains background tasks an orchestrator may run alongside the cache.
//!
//! # Tasks
//! - Expiry Sweep: Drops expired records and tombstones at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
