use sqlx::PgPool;

use crate::engine::{ActivateRequest, EngineApi, EngineError};
use crate::storage::postgres::{self, AssignmentWithWallet, RunningAssignment, StrategyRow};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("strategy {0} not found")]
    StrategyNotFound(i64),
    #[error("wallet {wallet_id} is not deployed (status '{status}')")]
    WalletNotDeployed { wallet_id: i64, status: String },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// activate — Stopped → Running for every eligible assignment
// ---------------------------------------------------------------------------

/// Start a strategy on every wallet it is assigned to.
///
/// Preconditions are checked read-only before anything mutates: every
/// stopped assignment's wallet must be deployed. Local flips then run
/// inside one transaction, interleaved with the engine calls; the first
/// engine failure rolls back every local flip. Engine calls already
/// issued are not compensated — the engine side may lead local state
/// until the caller retries or deactivates.
///
/// Only stopped assignments are touched, so re-invoking on an already
/// running strategy is a no-op. Returns the number of assignments
/// transitioned.
pub async fn activate(
    pool: &PgPool,
    engine: &dyn EngineApi,
    strategy_id: i64,
) -> Result<usize, ActivationError> {
    let strategy = postgres::get_strategy(pool, strategy_id)
        .await?
        .ok_or(ActivationError::StrategyNotFound(strategy_id))?;

    let pending = postgres::assignments_for_strategy(pool, strategy_id, false).await?;
    ensure_deployed(&pending)?;

    let mut tx = pool.begin().await?;
    for assignment in &pending {
        let req = build_activate_request(&strategy, assignment);
        engine.activate(&req).await?;

        sqlx::query(
            "UPDATE wallet_strategy SET is_running = true, started_at = NOW() WHERE id = $1",
        )
        .bind(assignment.assignment_id)
        .execute(&mut *tx)
        .await?;
    }

    refresh_is_active(&mut tx, strategy_id).await?;
    tx.commit().await?;

    metrics::counter!(crate::metrics::ACTIVATIONS_TOTAL).increment(1);
    tracing::info!(
        strategy_id,
        name = %strategy.name,
        assignments = pending.len(),
        "strategy_activated"
    );
    Ok(pending.len())
}

// ---------------------------------------------------------------------------
// deactivate — Running → Stopped
// ---------------------------------------------------------------------------

/// Mirror image of `activate`: stops every running assignment, clears
/// `started_at`, and recomputes `is_active`. Same transactional
/// contract and the same uncompensated-engine-call caveat.
pub async fn deactivate(
    pool: &PgPool,
    engine: &dyn EngineApi,
    strategy_id: i64,
) -> Result<usize, ActivationError> {
    postgres::get_strategy(pool, strategy_id)
        .await?
        .ok_or(ActivationError::StrategyNotFound(strategy_id))?;

    let running = postgres::assignments_for_strategy(pool, strategy_id, true).await?;

    let mut tx = pool.begin().await?;
    for assignment in &running {
        engine
            .deactivate(assignment.wallet_id, strategy_id)
            .await?;

        sqlx::query(
            "UPDATE wallet_strategy SET is_running = false, started_at = NULL WHERE id = $1",
        )
        .bind(assignment.assignment_id)
        .execute(&mut *tx)
        .await?;
    }

    refresh_is_active(&mut tx, strategy_id).await?;
    tx.commit().await?;

    metrics::counter!(crate::metrics::DEACTIVATIONS_TOTAL).increment(1);
    tracing::info!(
        strategy_id,
        assignments = running.len(),
        "strategy_deactivated"
    );
    Ok(running.len())
}

// ---------------------------------------------------------------------------
// Deletion sweeps — engine-only, best effort
// ---------------------------------------------------------------------------

/// Tell the engine to stop every running assignment of a strategy,
/// without touching local state — the caller is about to delete the
/// rows. The first engine failure propagates so deletion can be
/// aborted instead of orphaning a running remote strategy.
pub async fn deactivate_all_for_strategy(
    pool: &PgPool,
    engine: &dyn EngineApi,
    strategy_id: i64,
) -> Result<usize, ActivationError> {
    let running = postgres::running_assignments_for_strategy(pool, strategy_id).await?;
    let count = sweep(engine, &running).await?;
    tracing::info!(strategy_id, swept = count, "strategy_sweep_done");
    Ok(count)
}

/// Same sweep keyed by wallet, used when a wallet is being deleted.
pub async fn deactivate_all_for_wallet(
    pool: &PgPool,
    engine: &dyn EngineApi,
    wallet_id: i64,
) -> Result<usize, ActivationError> {
    let running = postgres::running_assignments_for_wallet(pool, wallet_id).await?;
    let count = sweep(engine, &running).await?;
    tracing::info!(wallet_id, swept = count, "wallet_sweep_done");
    Ok(count)
}

async fn sweep(
    engine: &dyn EngineApi,
    running: &[RunningAssignment],
) -> Result<usize, EngineError> {
    for assignment in running {
        engine
            .deactivate(assignment.wallet_id, assignment.strategy_id)
            .await?;
    }
    Ok(running.len())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ensure_deployed(pending: &[AssignmentWithWallet]) -> Result<(), ActivationError> {
    for assignment in pending {
        if assignment.deploy_status != "deployed" {
            return Err(ActivationError::WalletNotDeployed {
                wallet_id: assignment.wallet_id,
                status: assignment.deploy_status.clone(),
            });
        }
    }
    Ok(())
}

fn build_activate_request(
    strategy: &StrategyRow,
    assignment: &AssignmentWithWallet,
) -> ActivateRequest {
    ActivateRequest {
        wallet_id: assignment.wallet_id,
        strategy_id: strategy.id,
        graph: strategy.graph.clone(),
        markets: assignment.markets.clone(),
        max_position_usdc: assignment.max_position_usdc,
        is_paper: assignment.is_paper,
        private_key_enc: assignment.private_key_enc.clone(),
        safe_address: assignment.safe_address.clone(),
    }
}

/// `is_active` means "at least one assignment is running". Recomputed
/// inside the transaction so the flag and the flips commit together.
async fn refresh_is_active(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    strategy_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE strategies
        SET is_active = EXISTS (
            SELECT 1 FROM wallet_strategy
            WHERE strategy_id = $1 AND is_running = true
        )
        WHERE id = $1
        "#,
    )
    .bind(strategy_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
