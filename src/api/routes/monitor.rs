//! Cycle trigger endpoint

use axum::{Json, extract::State};
use tracing::debug;

use crate::api::state::ApiState;
use crate::engine::CycleReport;

/// POST /api/monitor
///
/// Runs one complete check cycle and returns the serialized report. No
/// request body; authentication happens in the route layer before this
/// handler is reached.
pub async fn run_monitor(State(state): State<ApiState>) -> Json<CycleReport> {
    debug!("cycle trigger received");

    let report = state.engine.run_cycle().await;

    Json(report)
}
