//! Focus Timer - A state-managed HTTP server for a focus countdown timer
//!
//! This library provides a countdown timer with an audible looping alarm, a
//! delayed desktop notification with an alert fallback, and a persisted
//! usage counter, exposed over a small JSON API.

pub mod api;
pub mod config;
pub mod countdown;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use countdown::CountdownController;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
