use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

// ---------------------------------------------------------------------------
// Metric name constants
// ---------------------------------------------------------------------------

pub const VALIDATIONS_TOTAL: &str = "stratd_graph_validations_total";
pub const VALIDATION_FAILURES_TOTAL: &str = "stratd_graph_validation_failures_total";
pub const GENERATIONS_TOTAL: &str = "stratd_generations_total";
pub const GENERATION_FAILURES_TOTAL: &str = "stratd_generation_failures_total";
pub const GENERATION_DURATION: &str = "stratd_generation_duration_seconds";
pub const ACTIVATIONS_TOTAL: &str = "stratd_activations_total";
pub const DEACTIVATIONS_TOTAL: &str = "stratd_deactivations_total";
pub const ENGINE_ERRORS_TOTAL: &str = "stratd_engine_errors_total";

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

pub fn init() -> PrometheusHandle {
    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full(GENERATION_DURATION.to_string()),
            &[0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0],
        )
        .expect("failed to set generation buckets");

    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus metrics recorder");

    describe_metrics();

    handle
}

fn describe_metrics() {
    metrics::describe_counter!(VALIDATIONS_TOTAL, "Strategy graphs validated");
    metrics::describe_counter!(VALIDATION_FAILURES_TOTAL, "Strategy graphs rejected by validation");
    metrics::describe_counter!(GENERATIONS_TOTAL, "Strategies generated from natural language");
    metrics::describe_counter!(GENERATION_FAILURES_TOTAL, "Generation attempts that failed");
    metrics::describe_histogram!(GENERATION_DURATION, "Provider round-trip for one generation (seconds)");
    metrics::describe_counter!(ACTIVATIONS_TOTAL, "Strategies activated");
    metrics::describe_counter!(DEACTIVATIONS_TOTAL, "Strategies deactivated");
    metrics::describe_counter!(ENGINE_ERRORS_TOTAL, "Failed calls to the execution engine");
}
