pub mod client;

use async_trait::async_trait;
use serde::Serialize;

pub use client::EngineClient;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Payload for the engine's activate endpoint. The private key travels
/// encrypted; only the engine's key store can open it.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateRequest {
    pub wallet_id: i64,
    pub strategy_id: i64,
    pub graph: serde_json::Value,
    pub markets: Vec<String>,
    pub max_position_usdc: f64,
    pub is_paper: bool,
    pub private_key_enc: String,
    pub safe_address: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failed engine call, with enough context for a user-facing message.
/// Never retried here; retry policy belongs to the caller's queueing
/// layer if it wants one.
#[derive(Debug, thiserror::Error)]
#[error("engine {operation} failed for wallet {wallet_id}, strategy {strategy_id}: {kind}")]
pub struct EngineError {
    pub operation: &'static str,
    pub wallet_id: i64,
    pub strategy_id: i64,
    pub kind: EngineErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineErrorKind {
    #[error("status {0}")]
    Status(u16),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// The execution engine as seen by this plane: start or stop one
/// wallet/strategy assignment. Injected so the orchestrator can be
/// driven against a recording fake in tests.
#[async_trait]
pub trait EngineApi: Send + Sync {
    async fn activate(&self, req: &ActivateRequest) -> Result<(), EngineError>;
    async fn deactivate(&self, wallet_id: i64, strategy_id: i64) -> Result<(), EngineError>;
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::testing::{RecordedCall, RecordingEngine};
    use super::*;

    fn request(wallet_id: i64) -> ActivateRequest {
        ActivateRequest {
            wallet_id,
            strategy_id: 7,
            graph: serde_json::json!({"mode": "form"}),
            markets: vec!["btc-updown-15m".into()],
            max_position_usdc: 100.0,
            is_paper: false,
            private_key_enc: "opaque".into(),
            safe_address: "0xsafe".into(),
        }
    }

    #[tokio::test]
    async fn test_recording_engine_records_in_order() {
        let engine = RecordingEngine::new();
        engine.activate(&request(1)).await.unwrap();
        engine.deactivate(1, 7).await.unwrap();
        let calls = engine.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                RecordedCall::Activate {
                    wallet_id: 1,
                    strategy_id: 7
                },
                RecordedCall::Deactivate {
                    wallet_id: 1,
                    strategy_id: 7
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_recording_engine_fails_from_index() {
        let engine = RecordingEngine::failing_from(1);
        engine.activate(&request(1)).await.unwrap();
        let err = engine.activate(&request(2)).await.unwrap_err();
        assert_eq!(err.wallet_id, 2);
        assert!(matches!(err.kind, EngineErrorKind::Status(500)));
    }

    #[test]
    fn test_activate_request_wire_shape() {
        let json = serde_json::to_value(request(1)).unwrap();
        for key in [
            "wallet_id",
            "strategy_id",
            "graph",
            "markets",
            "max_position_usdc",
            "is_paper",
            "private_key_enc",
            "safe_address",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
