//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, response::Json};
use tracing::info;

use crate::state::AppState;

use super::responses::{HealthResponse, SetRequest, StatusResponse, TimerResponse};

/// Handle POST /set - Configure the countdown from raw minute/second input
pub async fn set_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetRequest>,
) -> Json<TimerResponse> {
    let timer = state.controller.set(&request.minutes, &request.seconds);
    state.record_action("set");

    info!("Set endpoint called - countdown at {}", timer.format_remaining());
    Json(TimerResponse::new(
        format!("Countdown set to {}", timer.format_remaining()),
        &timer,
    ))
}

/// Handle POST /start-pause - Toggle between running and paused
pub async fn start_pause_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    let timer = state.controller.start_pause();

    let message = if timer.running {
        state.record_action("start");
        "Countdown running"
    } else if timer.remaining_seconds > 0 {
        state.record_action("pause");
        "Countdown paused"
    } else {
        "Nothing to count down"
    };

    info!("Start/pause endpoint called - {}", message);
    Json(TimerResponse::new(message.to_string(), &timer))
}

/// Handle POST /reset - Stop the countdown and tear down alarm resources
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    let timer = state.controller.reset();
    state.record_action("reset");

    info!("Reset endpoint called");
    Json(TimerResponse::new("Countdown reset".to_string(), &timer))
}

/// Handle GET /status - Return current timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.controller.snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: super::responses::TimerSnapshot::from_state(&timer),
        usage_count: state.controller.usage_count(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
