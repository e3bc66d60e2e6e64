use std::time::Duration;

use anyhow::{Context, Result};

const CHECK_INTERVAL: Duration = Duration::from_secs(2);
const TIMEOUT: Duration = Duration::from_secs(60);

/// Blocks until PostgreSQL and the execution engine are both reachable.
///
/// Checks run in parallel. Each service is polled every 2 seconds.
/// Fails after 60 seconds if either is still unreachable.
pub async fn wait_for_services(database_url: &str, engine_url: &str) -> Result<()> {
    tracing::info!("healthcheck_starting");

    tokio::try_join!(
        wait_for_postgres(database_url),
        wait_for_engine(engine_url),
    )?;

    tracing::info!("healthcheck_passed");
    Ok(())
}

async fn wait_for_postgres(url: &str) -> Result<()> {
    use sqlx::Connection;

    let deadline = tokio::time::Instant::now() + TIMEOUT;

    loop {
        match sqlx::PgConnection::connect(url).await {
            Ok(_) => {
                tracing::info!("postgres_ready");
                return Ok(());
            }
            Err(e) => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(e).context("PostgreSQL not ready within 60s");
                }
                tracing::warn!(error = %e, "waiting_for_postgres");
                tokio::time::sleep(CHECK_INTERVAL).await;
            }
        }
    }
}

async fn wait_for_engine(url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(CHECK_INTERVAL)
        .build()?;
    let status_url = format!("{}/internal/engine/status", url.trim_end_matches('/'));
    let deadline = tokio::time::Instant::now() + TIMEOUT;

    loop {
        let check = async {
            let resp = client.get(&status_url).send().await?;
            anyhow::ensure!(resp.status().is_success(), "engine status {}", resp.status());
            Ok::<(), anyhow::Error>(())
        };

        match check.await {
            Ok(()) => {
                tracing::info!("engine_ready");
                return Ok(());
            }
            Err(e) => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(e).context("execution engine not ready within 60s");
                }
                tracing::warn!(error = %e, "waiting_for_engine");
                tokio::time::sleep(CHECK_INTERVAL).await;
            }
        }
    }
}
