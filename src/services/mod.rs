//! External capability integrations
//!
//! Audio playback, desktop notifications and the persistent key-value store
//! are each kept behind a trait so the countdown core stays independent of
//! the concrete backends.

pub mod audio;
pub mod notify;
pub mod storage;

// Re-export main types
pub use audio::{AlarmHandle, AlarmPlayer, RodioAlarmPlayer};
pub use notify::{Authorization, DesktopNotifier, Notifier, ShownNotification};
pub use storage::{JsonFileStore, KvStore, MemoryStore};
