use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use crate::engine::EngineApi;
use crate::generate::Generator;

pub struct ApiState {
    pub db: PgPool,
    pub engine: Arc<dyn EngineApi>,
    pub generator: Generator,
    pub start_time: std::time::Instant,
    pub prometheus: PrometheusHandle,
}
