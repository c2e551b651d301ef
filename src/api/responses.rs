//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{TimerPhase, TimerState};

/// Request body for the set endpoint
///
/// Minutes and seconds arrive as raw strings and are validated at set time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub minutes: String,
    #[serde(default)]
    pub seconds: String,
}

/// Timer state as exposed to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub remaining_seconds: u64,
    pub display: String,
    pub running: bool,
    pub finished: bool,
    pub phase: TimerPhase,
}

impl TimerSnapshot {
    pub fn from_state(state: &TimerState) -> Self {
        Self {
            remaining_seconds: state.remaining_seconds,
            display: state.format_remaining(),
            running: state.running,
            finished: state.finished,
            phase: state.phase(),
        }
    }
}

/// API response structure for timer action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    /// Create a new timer response from a state snapshot
    pub fn new(message: String, state: &TimerState) -> Self {
        Self {
            message,
            timestamp: Utc::now(),
            timer: TimerSnapshot::from_state(state),
        }
    }
}

/// Enhanced status response with usage and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub usage_count: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: "0.1.0".to_string(),
        }
    }
}
