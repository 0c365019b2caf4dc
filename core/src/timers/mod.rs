//! Timer system
//!
//! This module provides:
//! - **Timer**: one scheduled callback with a deadline and optional interval
//! - **Queue**: deadline-ordered min-heap with O(log n) removal by slot
//! - **Manager**: id allocation, cancellation and the run-due batch protocol
//!
//! # Timer Lifecycle
//!
//! 1. `add_timer` → timer is *pending* in the queue
//! 2. `run_due_timers(now)` reaches its deadline → timer is *firing*
//! 3. One-shot timers retire; repeating timers are pending again with
//!    `deadline += interval`
//!
//! `remove_timer` retires a pending timer at any point.

mod manager;
mod queue;
mod timer;


pub use manager::{DEFAULT_QUEUE_CAPACITY, TimerManager};
pub use timer::{TimerCallback, TimerId, TimerInfo, Timestamp};
