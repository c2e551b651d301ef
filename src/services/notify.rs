//! Desktop notification capability

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Notification authorization status, re-checked at every fire time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    NotYetDecided,
    Granted,
    Denied,
}

/// System notification capability
pub trait Notifier: Send + Sync {
    fn authorization(&self) -> Authorization;

    /// Request authorization, fire-and-forget; the result is only observed
    /// through later `authorization()` calls
    fn request_authorization(&self);

    fn show(&self, title: &str, body: &str) -> Result<ShownNotification, String>;

    /// Synchronous acknowledgment fallback for when notifications are
    /// unavailable or unauthorized
    fn blocking_alert(&self, message: &str);
}

/// Ownership of one displayed notification
///
/// Carries a best-effort programmatic close and a one-shot dismissal signal;
/// click and close both count as dismissal.
pub struct ShownNotification {
    closer: Option<Box<dyn FnOnce() + Send>>,
    dismissed: Option<oneshot::Receiver<()>>,
}

impl ShownNotification {
    pub fn new(
        closer: Option<Box<dyn FnOnce() + Send>>,
        dismissed: Option<oneshot::Receiver<()>>,
    ) -> Self {
        Self { closer, dismissed }
    }

    /// Close the notification; safe to call more than once
    pub fn close(&mut self) {
        if let Some(close) = self.closer.take() {
            close();
        }
    }

    /// Take the dismissal signal, at most once
    pub fn take_dismissed(&mut self) -> Option<oneshot::Receiver<()>> {
        self.dismissed.take()
    }
}

const STATUS_UNDECIDED: u8 = 0;
const STATUS_GRANTED: u8 = 1;
const STATUS_DENIED: u8 = 2;

/// Notifier backed by the desktop notification daemon
///
/// There is no browser-style permission prompt on the desktop, so
/// authorization maps to daemon reachability: undecided until probed, then
/// granted or denied for the rest of the run.
pub struct DesktopNotifier {
    enabled: bool,
    status: Arc<AtomicU8>,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            status: Arc::new(AtomicU8::new(STATUS_UNDECIDED)),
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn probe() -> u8 {
        match notify_rust::get_capabilities() {
            Ok(_) => STATUS_GRANTED,
            Err(_) => STATUS_DENIED,
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn probe() -> u8 {
        STATUS_GRANTED
    }
}

impl Notifier for DesktopNotifier {
    fn authorization(&self) -> Authorization {
        if !self.enabled {
            return Authorization::Denied;
        }
        match self.status.load(Ordering::SeqCst) {
            STATUS_GRANTED => Authorization::Granted,
            STATUS_DENIED => Authorization::Denied,
            _ => Authorization::NotYetDecided,
        }
    }

    fn request_authorization(&self) {
        if !self.enabled || self.status.load(Ordering::SeqCst) != STATUS_UNDECIDED {
            return;
        }

        let status = Arc::clone(&self.status);
        std::thread::spawn(move || {
            let probed = Self::probe();
            status.store(probed, Ordering::SeqCst);
            debug!(
                "Notification capability probe finished: {}",
                if probed == STATUS_GRANTED { "granted" } else { "denied" }
            );
        });
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn show(&self, title: &str, body: &str) -> Result<ShownNotification, String> {
        let handle = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("focus-timer")
            .icon("alarm-clock")
            .show()
            .map_err(|e| e.to_string())?;
        let id = handle.id();

        let (dismissed_tx, dismissed_rx) = oneshot::channel();
        // on_close blocks until the user clicks or dismisses, so it gets
        // its own thread; the sender sits in a take-once slot because the
        // close handler is only Fn
        let dismissed_tx = std::sync::Mutex::new(Some(dismissed_tx));
        std::thread::spawn(move || {
            handle.on_close(|| {
                if let Some(tx) = dismissed_tx.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = tx.send(());
                }
            });
        });

        // notify-rust has no close-by-id, so programmatic close replaces
        // the on-screen notification with one that expires immediately;
        // the replacement also unblocks the on_close wait above
        let closer: Box<dyn FnOnce() + Send> = Box::new(move || {
            std::thread::spawn(move || {
                let _ = notify_rust::Notification::new()
                    .id(id)
                    .summary(" ")
                    .appname("focus-timer")
                    .timeout(notify_rust::Timeout::Milliseconds(1))
                    .show();
            });
        });

        Ok(ShownNotification::new(Some(closer), Some(dismissed_rx)))
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn show(&self, title: &str, body: &str) -> Result<ShownNotification, String> {
        notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("focus-timer")
            .show()
            .map_err(|e| e.to_string())?;

        // no dismissal reporting on this platform
        Ok(ShownNotification::new(None, None))
    }

    fn blocking_alert(&self, message: &str) {
        // a headless service has no dialog to block on; the acknowledgment
        // is a log line and teardown follows immediately
        warn!("⏰ ALARM: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn close_fires_the_closer_exactly_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closes);
        let mut shown = ShownNotification::new(
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            None,
        );

        shown.close();
        shown.close();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_on_a_closerless_notification_is_a_noop() {
        let mut shown = ShownNotification::new(None, None);
        shown.close();
        shown.close();
    }

    #[test]
    fn dismissal_signal_can_be_taken_at_most_once() {
        let (_tx, rx) = oneshot::channel();
        let mut shown = ShownNotification::new(None, Some(rx));
        assert!(shown.take_dismissed().is_some());
        assert!(shown.take_dismissed().is_none());
    }
}
