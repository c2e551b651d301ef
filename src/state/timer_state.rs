//! Timer state structure and management

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the countdown, derived from the state fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Configured,
    Running,
    Finished,
}

/// Countdown state snapshot: remaining time, run flag and the one-shot
/// finished latch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub running: bool,
    pub finished: bool,
}

impl TimerState {
    /// Create a new idle timer state
    pub fn new() -> Self {
        Self {
            remaining_seconds: 0,
            running: false,
            finished: false,
        }
    }

    /// Derive the lifecycle phase from the raw fields
    pub fn phase(&self) -> TimerPhase {
        if self.finished {
            TimerPhase::Finished
        } else if self.running {
            TimerPhase::Running
        } else if self.remaining_seconds > 0 {
            TimerPhase::Configured
        } else {
            TimerPhase::Idle
        }
    }

    /// Format the remaining time as zero-padded `MM:SS` (unbounded minutes)
    pub fn format_remaining(&self) -> String {
        let minutes = self.remaining_seconds / 60;
        let seconds = self.remaining_seconds % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle() {
        let state = TimerState::new();
        assert_eq!(state.remaining_seconds, 0);
        assert!(!state.running);
        assert!(!state.finished);
        assert_eq!(state.phase(), TimerPhase::Idle);
    }

    #[test]
    fn phase_follows_fields() {
        let mut state = TimerState::new();
        state.remaining_seconds = 90;
        assert_eq!(state.phase(), TimerPhase::Configured);

        state.running = true;
        assert_eq!(state.phase(), TimerPhase::Running);

        state.running = false;
        state.remaining_seconds = 0;
        state.finished = true;
        assert_eq!(state.phase(), TimerPhase::Finished);
    }

    #[test]
    fn formats_ninety_seconds_as_01_30() {
        let state = TimerState {
            remaining_seconds: 90,
            running: false,
            finished: false,
        };
        assert_eq!(state.format_remaining(), "01:30");
    }

    #[test]
    fn formats_with_unbounded_minutes() {
        let state = TimerState {
            remaining_seconds: 125 * 60 + 7,
            running: false,
            finished: false,
        };
        assert_eq!(state.format_remaining(), "125:07");
    }

    #[test]
    fn formats_zero_as_00_00() {
        assert_eq!(TimerState::new().format_remaining(), "00:00");
    }
}
