use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Connection pool
// ---------------------------------------------------------------------------

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    tracing::info!("postgres_pool_connecting");
    let pool = PgPool::connect(database_url).await?;
    tracing::info!("postgres_pool_connected");
    Ok(pool)
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StrategyRow {
    pub id: i64,
    pub name: String,
    pub graph: serde_json::Value,
}

/// One wallet_strategy row joined with the wallet fields the
/// orchestrator needs: deployment status gates activation, the signing
/// material is forwarded to the engine opaque.
#[derive(Debug, Clone)]
pub struct AssignmentWithWallet {
    pub assignment_id: i64,
    pub wallet_id: i64,
    pub markets: Vec<String>,
    pub max_position_usdc: f64,
    pub is_paper: bool,
    pub deploy_status: String,
    pub private_key_enc: String,
    pub safe_address: String,
}

/// A running assignment, as seen by the deletion sweeps.
#[derive(Debug, Clone)]
pub struct RunningAssignment {
    pub wallet_id: i64,
    pub strategy_id: i64,
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

pub async fn get_strategy(pool: &PgPool, id: i64) -> Result<Option<StrategyRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, serde_json::Value)>(
        r#"
        SELECT id, name, graph
        FROM strategies
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, name, graph)| StrategyRow { id, name, graph }))
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// Assignments for a strategy in the given run-state, joined with their
/// wallet. `is_running = false` feeds activate, `true` feeds deactivate.
pub async fn assignments_for_strategy(
    pool: &PgPool,
    strategy_id: i64,
    is_running: bool,
) -> Result<Vec<AssignmentWithWallet>, sqlx::Error> {
    let rows = sqlx::query_as::<
        _,
        (
            i64,
            i64,
            serde_json::Value,
            f64,
            bool,
            String,
            String,
            String,
        ),
    >(
        r#"
        SELECT ws.id, ws.wallet_id, ws.markets, ws.max_position_usdc, ws.is_paper,
               w.deploy_status, w.private_key_enc, w.safe_address
        FROM wallet_strategy ws
        JOIN wallets w ON w.id = ws.wallet_id
        WHERE ws.strategy_id = $1
          AND ws.is_running = $2
        ORDER BY ws.id
        "#,
    )
    .bind(strategy_id)
    .bind(is_running)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(
                assignment_id,
                wallet_id,
                markets,
                max_position_usdc,
                is_paper,
                deploy_status,
                private_key_enc,
                safe_address,
            )| AssignmentWithWallet {
                assignment_id,
                wallet_id,
                markets: serde_json::from_value(markets).unwrap_or_default(),
                max_position_usdc,
                is_paper,
                deploy_status,
                private_key_enc,
                safe_address,
            },
        )
        .collect())
}

pub async fn running_assignments_for_strategy(
    pool: &PgPool,
    strategy_id: i64,
) -> Result<Vec<RunningAssignment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT wallet_id, strategy_id
        FROM wallet_strategy
        WHERE strategy_id = $1
          AND is_running = true
        ORDER BY id
        "#,
    )
    .bind(strategy_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(wallet_id, strategy_id)| RunningAssignment {
            wallet_id,
            strategy_id,
        })
        .collect())
}

pub async fn running_assignments_for_wallet(
    pool: &PgPool,
    wallet_id: i64,
) -> Result<Vec<RunningAssignment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT wallet_id, strategy_id
        FROM wallet_strategy
        WHERE wallet_id = $1
          AND is_running = true
        ORDER BY id
        "#,
    )
    .bind(wallet_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(wallet_id, strategy_id)| RunningAssignment {
            wallet_id,
            strategy_id,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Status counts
// ---------------------------------------------------------------------------

pub async fn count_active_strategies(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM strategies WHERE is_active = true")
        .fetch_one(pool)
        .await
}

pub async fn count_running_assignments(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM wallet_strategy WHERE is_running = true")
        .fetch_one(pool)
        .await
}
