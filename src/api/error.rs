use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::activation::ActivationError;
use crate::generate::GenerateError;
use crate::graph::validate::ValidationError;
use crate::graph::GraphError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub enum ApiError {
    /// One structural/semantic violation with a field path (form mode).
    Validation(ValidationError),
    /// Accumulated safety violations (node mode) — reported together so
    /// the editor can flag every offending node.
    ValidationMany(Vec<ValidationError>),
    /// The request body is not a strategy graph at all.
    Parse(String),
    NotFound(String),
    Conflict(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.message, "path": err.path })),
            )
                .into_response(),
            Self::ValidationMany(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            Self::Parse(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody { error: msg })).into_response()
            }
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: msg })).into_response()
            }
            Self::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(ErrorBody { error: msg })).into_response()
            }
            Self::Upstream(msg) => {
                (StatusCode::BAD_GATEWAY, Json(ErrorBody { error: msg })).into_response()
            }
            Self::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: msg })).into_response()
            }
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Form(e) => Self::Validation(e),
            GraphError::Safety(errors) => Self::ValidationMany(errors),
        }
    }
}

impl From<ActivationError> for ApiError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::StrategyNotFound(_) => Self::NotFound(err.to_string()),
            ActivationError::WalletNotDeployed { .. } => Self::Conflict(err.to_string()),
            ActivationError::Engine(e) => {
                metrics::counter!(crate::metrics::ENGINE_ERRORS_TOTAL).increment(1);
                Self::Upstream(format!("engine may be unavailable: {e}"))
            }
            ActivationError::Db(e) => {
                tracing::error!(error = %e, "activation_db_error");
                Self::Internal("database error".into())
            }
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Validation(e) => Self::Validation(e),
            GenerateError::Api { .. } | GenerateError::InvalidJson { .. } => {
                Self::Upstream(err.to_string())
            }
            GenerateError::Transport(e) => {
                Self::Upstream(format!("generation provider unreachable: {e}"))
            }
        }
    }
}
