use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::state::ApiState;
use crate::graph::validate::ValidationError;
use crate::graph::StrategyGraph;

const MIN_DESCRIPTION_CHARS: usize = 10;
const MAX_DESCRIPTION_CHARS: usize = 1000;

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub description: String,
}

pub async fn generate(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<StrategyGraph>, ApiError> {
    let chars = req.description.chars().count();
    if !(MIN_DESCRIPTION_CHARS..=MAX_DESCRIPTION_CHARS).contains(&chars) {
        return Err(ApiError::Validation(ValidationError::new(
            "description",
            format!(
                "description must be between {MIN_DESCRIPTION_CHARS} and {MAX_DESCRIPTION_CHARS} characters"
            ),
        )));
    }

    metrics::counter!(crate::metrics::GENERATIONS_TOTAL).increment(1);
    let started = std::time::Instant::now();
    let result = state.generator.generate(&req.description).await;
    metrics::histogram!(crate::metrics::GENERATION_DURATION)
        .record(started.elapsed().as_secs_f64());

    match result {
        Ok(graph) => Ok(Json(StrategyGraph::Form(graph))),
        Err(err) => {
            metrics::counter!(crate::metrics::GENERATION_FAILURES_TOTAL).increment(1);
            tracing::warn!(error = %err, "generation_failed");
            Err(err.into())
        }
    }
}
