//! Countdown tick background task

use tokio::time::sleep;
use tracing::info;

use crate::countdown::{CountdownController, TICK_PERIOD};

/// Background task that drives the countdown one second at a time
///
/// Not a free-running interval: at most one sleep is armed at a time, and
/// only while the countdown is running with time remaining. Any state
/// change cancels the pending sleep and a fresh one is armed against the
/// new state, so a sleep from a previous cycle never counts against the
/// next one.
pub async fn tick_task(controller: CountdownController) {
    info!("Starting countdown tick task");

    let mut updates = controller.subscribe();

    loop {
        loop {
            let armed = {
                let state = updates.borrow_and_update();
                state.running && state.remaining_seconds > 0
            };
            if armed {
                break;
            }
            if updates.changed().await.is_err() {
                info!("Timer channel closed, stopping tick task");
                return;
            }
        }

        tokio::select! {
            _ = sleep(TICK_PERIOD) => controller.tick(),
            changed = updates.changed() => {
                if changed.is_err() {
                    info!("Timer channel closed, stopping tick task");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::services::{
        audio::{AlarmHandle, AlarmPlayer},
        notify::{Authorization, Notifier, ShownNotification},
        storage::MemoryStore,
    };

    struct SilentPlayer;

    impl AlarmPlayer for SilentPlayer {
        fn start(&self) -> Option<Box<dyn AlarmHandle>> {
            None
        }
    }

    struct DeniedNotifier;

    impl Notifier for DeniedNotifier {
        fn authorization(&self) -> Authorization {
            Authorization::Denied
        }

        fn request_authorization(&self) {}

        fn show(&self, _title: &str, _body: &str) -> Result<ShownNotification, String> {
            Err("denied".to_string())
        }

        fn blocking_alert(&self, _message: &str) {}
    }

    fn controller() -> CountdownController {
        CountdownController::new(
            Arc::new(SilentPlayer),
            Arc::new(DeniedNotifier),
            Arc::new(MemoryStore::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn drives_a_running_countdown_to_finish() {
        let controller = controller();
        tokio::spawn(tick_task(controller.clone()));

        controller.set("0", "2");
        controller.start_pause();

        sleep(Duration::from_millis(2500)).await;
        let state = controller.snapshot();
        assert_eq!(state.remaining_seconds, 0);
        assert!(!state.running);
        assert!(state.finished);
    }

    #[tokio::test(start_paused = true)]
    async fn restarted_countdown_keeps_its_full_first_second() {
        let controller = controller();
        tokio::spawn(tick_task(controller.clone()));

        controller.set("0", "10");
        controller.start_pause();
        sleep(Duration::from_millis(900)).await;

        // reconfigure while the first tick is still pending; the stale
        // sleep must not count against the new cycle
        controller.reset();
        controller.set("0", "5");
        controller.start_pause();

        sleep(Duration::from_millis(150)).await;
        assert_eq!(controller.snapshot().remaining_seconds, 5);

        sleep(Duration::from_millis(900)).await;
        assert_eq!(controller.snapshot().remaining_seconds, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_tick_while_paused() {
        let controller = controller();
        tokio::spawn(tick_task(controller.clone()));

        controller.set("0", "30");
        controller.start_pause();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(controller.snapshot().remaining_seconds, 28);

        controller.start_pause();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(controller.snapshot().remaining_seconds, 28);
    }
}
