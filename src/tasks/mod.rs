//! Background Tasks Module
//!
//! # Tasks
//! - TTL Sweep: Removes expired local cache entries at a configured interval

mod cleanup;

pub use cleanup::spawn_sweep_task;
