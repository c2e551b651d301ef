//! Focus Timer - A state-managed HTTP server for a focus countdown timer
//!
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use focus_timer::{
    api::create_router,
    config::Config,
    countdown::CountdownController,
    services::{DesktopNotifier, JsonFileStore, RodioAlarmPlayer},
    state::AppState,
    tasks::tick_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer server v0.1.0");
    info!(
        "Configuration: host={}, port={}, data_file={}",
        config.host,
        config.port,
        config.data_file.display()
    );

    // Wire up the external capabilities behind their traits
    let store = Arc::new(JsonFileStore::open(config.data_file.clone()));
    let player = Arc::new(RodioAlarmPlayer::new(config.sound.clone()));
    let notifier = Arc::new(DesktopNotifier::new(!config.no_notify));

    // Create the countdown controller (this also primes notification
    // authorization) and the shared application state
    let controller = CountdownController::new(player, notifier, store);
    let state = Arc::new(AppState::new(
        controller.clone(),
        config.port,
        config.host.clone(),
    ));

    // Start the countdown tick background task
    tokio::spawn(tick_task(controller.clone()));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /set         - Configure the countdown (raw minutes/seconds)");
    info!("  POST /start-pause - Toggle between running and paused");
    info!("  POST /reset       - Stop the countdown and silence the alarm");
    info!("  GET  /status      - Check timer state and usage count");
    info!("  GET  /health      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Dispose of the controller: cancel any pending notification and tear
    // down alarm resources
    controller.shutdown();

    info!("Server shutdown complete");
    Ok(())
}
