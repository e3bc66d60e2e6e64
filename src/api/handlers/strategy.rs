use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::state::ApiState;
use crate::graph::StrategyGraph;

// ---------------------------------------------------------------------------
// Validate + normalize
// ---------------------------------------------------------------------------

/// Validate a graph in either mode and hand back the normalized form.
/// A failed validation never reaches storage — the caller persists the
/// body of a 200 and nothing else.
pub async fn validate(
    Json(body): Json<serde_json::Value>,
) -> Result<Json<StrategyGraph>, ApiError> {
    metrics::counter!(crate::metrics::VALIDATIONS_TOTAL).increment(1);

    let mut graph: StrategyGraph = serde_json::from_value(body).map_err(|e| {
        metrics::counter!(crate::metrics::VALIDATION_FAILURES_TOTAL).increment(1);
        ApiError::Parse(format!("not a strategy graph: {e}"))
    })?;

    if let Err(err) = graph.validate() {
        metrics::counter!(crate::metrics::VALIDATION_FAILURES_TOTAL).increment(1);
        return Err(err.into());
    }

    graph.normalize();
    Ok(Json(graph))
}

// ---------------------------------------------------------------------------
// Activate / deactivate
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TransitionResponse {
    pub strategy_id: i64,
    pub assignments: usize,
}

pub async fn activate(
    State(state): State<Arc<ApiState>>,
    Path(strategy_id): Path<i64>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let assignments =
        crate::activation::activate(&state.db, state.engine.as_ref(), strategy_id).await?;
    Ok(Json(TransitionResponse {
        strategy_id,
        assignments,
    }))
}

pub async fn deactivate(
    State(state): State<Arc<ApiState>>,
    Path(strategy_id): Path<i64>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let assignments =
        crate::activation::deactivate(&state.db, state.engine.as_ref(), strategy_id).await?;
    Ok(Json(TransitionResponse {
        strategy_id,
        assignments,
    }))
}
