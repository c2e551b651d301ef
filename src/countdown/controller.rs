//! Countdown controller: the timer state machine and its finish sequence
//!
//! The controller owns the timer state plus three resource slots: the live
//! alarm playback, the pending delayed-notification task and the displayed
//! notification. Every exit path (reset, reconfigure, dismissal, fallback,
//! disposal) funnels through one idempotent teardown routine that clears all
//! three slots.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::countdown::input;
use crate::services::{
    audio::{AlarmHandle, AlarmPlayer},
    notify::{Authorization, Notifier, ShownNotification},
    storage::{self, KvStore},
};
use crate::state::TimerState;

/// Cadence of the countdown tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Delay between the alarm starting and the notification being raised
pub const NOTIFICATION_DELAY: Duration = Duration::from_secs(3);

const NOTIFICATION_TITLE: &str = "⏰ Timer finished!";
const NOTIFICATION_BODY: &str = "Time is up!";

/// Mutable controller state, guarded by a single lock
struct ControllerState {
    timer: TimerState,
    usage_count: u64,
    alarm: Option<Box<dyn AlarmHandle>>,
    pending_notification: Option<JoinHandle<()>>,
    notification: Option<ShownNotification>,
}

struct Inner {
    state: Mutex<ControllerState>,
    player: Arc<dyn AlarmPlayer>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn KvStore>,
    update_tx: watch::Sender<TimerState>,
    /// Keep one receiver alive to prevent channel closure
    _update_rx: watch::Receiver<TimerState>,
}

/// Handle to the countdown state machine; cheap to clone
#[derive(Clone)]
pub struct CountdownController {
    inner: Arc<Inner>,
}

impl CountdownController {
    /// Create a controller and prime notification authorization
    pub fn new(
        player: Arc<dyn AlarmPlayer>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        let usage_count = storage::load_usage_count(store.as_ref());
        info!("Loaded usage count: {}", usage_count);

        let (update_tx, update_rx) = watch::channel(TimerState::new());

        let controller = Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ControllerState {
                    timer: TimerState::new(),
                    usage_count,
                    alarm: None,
                    pending_notification: None,
                    notification: None,
                }),
                player,
                notifier,
                store,
                update_tx,
                _update_rx: update_rx,
            }),
        };

        // request authorization once, fire-and-forget; the finish sequence
        // re-checks status at fire time
        if controller.inner.notifier.authorization() == Authorization::NotYetDecided {
            controller.inner.notifier.request_authorization();
        }

        controller
    }

    /// Subscribe to timer state updates
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.inner.update_tx.subscribe()
    }

    /// Get a snapshot of the current timer state
    pub fn snapshot(&self) -> TimerState {
        self.lock().timer.clone()
    }

    /// Get the current usage count
    pub fn usage_count(&self) -> u64 {
        self.lock().usage_count
    }

    /// Configure the countdown from the raw minute/second fields
    ///
    /// Clears the finished latch and cancels any in-flight alarm or
    /// notification sequence from a prior cycle.
    pub fn set(&self, minutes: &str, seconds: &str) -> TimerState {
        let remaining = input::parse_duration(minutes, seconds);

        let mut state = self.lock();
        state.timer.remaining_seconds = remaining;
        state.timer.running = false;
        state.timer.finished = false;
        Self::teardown(&mut state);
        self.publish(&state);

        info!("Countdown set to {}", state.timer.format_remaining());
        state.timer.clone()
    }

    /// Toggle between running and paused
    ///
    /// No-op when there is nothing to count down. Every transition into
    /// running with time remaining bumps the persisted usage counter,
    /// resume from pause included.
    pub fn start_pause(&self) -> TimerState {
        let mut state = self.lock();

        if state.timer.remaining_seconds == 0 && !state.timer.running {
            debug!("Start/pause ignored: nothing to count down");
            return state.timer.clone();
        }

        if !state.timer.running && state.timer.remaining_seconds > 0 {
            state.usage_count += 1;
            storage::save_usage_count(self.inner.store.as_ref(), state.usage_count);
            info!("Usage count incremented to {}", state.usage_count);
        }

        state.timer.running = !state.timer.running;
        self.publish(&state);

        info!(
            "Countdown {} at {}",
            if state.timer.running { "running" } else { "paused" },
            state.timer.format_remaining()
        );
        state.timer.clone()
    }

    /// Advance the countdown by one elapsed second
    ///
    /// Only acts while running with time remaining; reaching zero invokes
    /// the finish sequence exactly once.
    pub fn tick(&self) {
        let mut state = self.lock();

        if !state.timer.running || state.timer.remaining_seconds == 0 {
            return;
        }

        if state.timer.remaining_seconds <= 1 {
            state.timer.remaining_seconds = 0;
            if !state.timer.finished {
                self.finish(&mut state);
            }
        } else {
            state.timer.remaining_seconds -= 1;
        }

        self.publish(&state);
    }

    /// Stop the countdown and clear all state and resources; idempotent
    pub fn reset(&self) -> TimerState {
        let mut state = self.lock();
        state.timer.running = false;
        state.timer.remaining_seconds = 0;
        state.timer.finished = false;
        Self::teardown(&mut state);
        self.publish(&state);

        info!("Countdown reset");
        state.timer.clone()
    }

    /// Release all alarm and notification resources; idempotent, safe to
    /// call on an already-clean state
    pub fn stop_alarm(&self) {
        let mut state = self.lock();
        Self::teardown(&mut state);
    }

    /// Dispose of the controller: cancel the pending delayed action and run
    /// full teardown
    pub fn shutdown(&self) {
        info!("Disposing countdown controller");
        self.stop_alarm();
    }

    /// Finish sequence, invoked at most once per cycle
    ///
    /// The latch is set here, under the lock, before the alarm start or the
    /// delayed-action spawn, so a duplicate tick cannot start two
    /// overlapping sequences.
    fn finish(&self, state: &mut MutexGuard<'_, ControllerState>) {
        state.timer.finished = true;
        state.timer.running = false;

        // defensive cleanup of anything left from a prior cycle
        if let Some(pending) = state.pending_notification.take() {
            pending.abort();
        }
        if let Some(mut stale) = state.notification.take() {
            stale.close();
        }

        // best-effort alarm; the sequence proceeds either way
        state.alarm = self.inner.player.start();
        if state.alarm.is_none() {
            debug!("Alarm playback unavailable");
        }

        let controller = self.clone();
        state.pending_notification = Some(tokio::spawn(async move {
            tokio::time::sleep(NOTIFICATION_DELAY).await;
            controller.raise_notification();
        }));

        info!("Countdown finished, alarm started and notification scheduled");
    }

    /// Delayed-notification action, fired once per finish sequence
    fn raise_notification(&self) {
        let mut state = self.lock();
        state.pending_notification = None;

        // a reset or reconfigure between arming and firing cleared the
        // latch; a cancelled action must never show anything
        if !state.timer.finished {
            return;
        }

        match self.inner.notifier.authorization() {
            Authorization::Granted => {
                if let Some(mut stale) = state.notification.take() {
                    stale.close();
                }
                match self
                    .inner
                    .notifier
                    .show(NOTIFICATION_TITLE, NOTIFICATION_BODY)
                {
                    Ok(mut shown) => {
                        if let Some(dismissed) = shown.take_dismissed() {
                            let controller = self.clone();
                            // the watcher is not a resource slot: after a
                            // teardown it stays parked until the sender
                            // drops, and its stop_alarm on an already-clean
                            // state is a no-op
                            tokio::spawn(async move {
                                if dismissed.await.is_ok() {
                                    debug!("Notification dismissed, tearing down");
                                    controller.stop_alarm();
                                }
                            });
                        }
                        state.notification = Some(shown);
                        info!("Notification shown");
                    }
                    Err(e) => {
                        warn!("Failed to show notification: {}", e);
                        drop(state);
                        self.alert_and_stop();
                    }
                }
            }
            _ => {
                drop(state);
                self.alert_and_stop();
            }
        }
    }

    /// Fallback acknowledgment followed by immediate teardown
    fn alert_and_stop(&self) {
        self.inner.notifier.blocking_alert(NOTIFICATION_BODY);
        self.stop_alarm();
    }

    /// Clear all three resource slots regardless of their prior state
    fn teardown(state: &mut MutexGuard<'_, ControllerState>) {
        if let Some(mut alarm) = state.alarm.take() {
            alarm.stop();
        }
        if let Some(pending) = state.pending_notification.take() {
            pending.abort();
        }
        if let Some(mut notification) = state.notification.take() {
            notification.close();
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        // a panic while holding the lock poisons it; the state itself is
        // still coherent, so recover rather than propagate
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, state: &ControllerState) {
        if let Err(e) = self.inner.update_tx.send(state.timer.clone()) {
            warn!("Failed to send timer update: {}", e);
        }
    }
}
