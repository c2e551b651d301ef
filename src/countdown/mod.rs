//! Countdown core module
//!
//! The controller state machine and the raw input validation that feeds it.

pub mod controller;
pub mod input;

// Re-export main types
pub use controller::{CountdownController, NOTIFICATION_DELAY, TICK_PERIOD};
