//! Background Tasks Module
//!
//! Optional host-side helpers that run against the cache engine.

mod sweep;

pub use sweep::spawn_sweep_task;
