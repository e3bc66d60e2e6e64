use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::ApiState;
use crate::storage::postgres;

#[derive(Serialize)]
pub struct StatusResponse {
    pub active_strategies: i64,
    pub running_assignments: i64,
    pub uptime_secs: u64,
}

pub async fn status(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let active_strategies = postgres::count_active_strategies(&state.db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let running_assignments = postgres::count_running_assignments(&state.db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(StatusResponse {
        active_strategies,
        running_assignments,
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}
