//! Daily Problems · backend
//!
//! - Axum HTTP API: `GET /problems/date/:date` (MM-DD-YYYY)
//! - Daily scheduler that selects and stores the current UTC day's problems at `run_at_utc`
//! - SQLite problem store
//!
//! Important env variables:
//!   DAILY_CONFIG_PATH    : path to TOML config (all sections optional)
//!   PORT                 : u16 (default 3000)
//!   DATABASE_PATH        : SQLite file (default "data/problems.db")
//!   PROBLEM_TABLE_NAME   : table holding problem rows (default "problems")
//!   LEETCODE_GRAPHQL_URL : provider endpoint
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use daily_problems::{build_router, scheduler, telemetry, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let config = AppConfig::load_from_env();
    let port = config.server.port;
    let schedule = config.schedule.clone();

    let state = AppState::from_config(config).inspect_err(|e| {
        error!(target: "daily_problems", error = %e, "Failed to initialise state");
    })?;

    let scheduler = scheduler::spawn_daily(state.selector.clone(), schedule);

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(target: "daily_problems", %addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler {
        handle.abort();
    }
    info!(target: "daily_problems", "Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(target: "daily_problems", error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
