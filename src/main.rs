mod activation;
mod api;
mod config;
mod engine;
mod generate;
mod graph;
mod healthcheck;
mod http;
mod metrics;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use config::Config;
use engine::EngineClient;
use generate::Generator;
use http::HttpClients;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let prometheus_handle = metrics::init();
    let cfg = Config::from_env()?;
    tracing::info!(engine_url = %cfg.engine_url, "stratd_starting");

    healthcheck::wait_for_services(&cfg.database_url, &cfg.engine_url).await?;

    let db = storage::postgres::create_pool(&cfg.database_url).await?;
    let clients = HttpClients::new(
        Duration::from_secs(cfg.engine_timeout_secs),
        Duration::from_secs(cfg.generation_timeout_secs),
    )?;

    let engine = Arc::new(EngineClient::new(clients.engine().clone(), &cfg.engine_url));
    let generator = Generator::new(clients.generation().clone(), &cfg);

    let state = Arc::new(api::state::ApiState {
        db,
        engine,
        generator,
        start_time: std::time::Instant::now(),
        prometheus: prometheus_handle,
    });

    tracing::info!("stratd_running");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("stratd_shutdown");
        }
        result = api::serve(state, cfg.api_port) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "api_server_fatal");
            }
        }
    }

    tracing::info!("stratd_stopped");
    Ok(())
}
