use async_trait::async_trait;
use serde_json::json;

use super::{ActivateRequest, EngineApi, EngineError, EngineErrorKind};

// ---------------------------------------------------------------------------
// EngineClient — HTTP implementation against the execution engine
// ---------------------------------------------------------------------------

/// Talks to the execution engine's internal API. A 2xx is success;
/// any other status or a transport failure is a hard error — this
/// plane never parses engine error bodies.
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
}

impl EngineClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        operation: &'static str,
        wallet_id: i64,
        strategy_id: i64,
    ) -> Result<(), EngineError> {
        let err = |kind| EngineError {
            operation,
            wallet_id,
            strategy_id,
            kind,
        };

        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| err(EngineErrorKind::Transport(e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(err(EngineErrorKind::Status(status.as_u16())));
        }
        Ok(())
    }
}

#[async_trait]
impl EngineApi for EngineClient {
    async fn activate(&self, req: &ActivateRequest) -> Result<(), EngineError> {
        let body = serde_json::to_value(req).expect("ActivateRequest serializes");
        self.post(
            "/internal/strategy/activate",
            &body,
            "activate",
            req.wallet_id,
            req.strategy_id,
        )
        .await?;
        tracing::info!(
            wallet_id = req.wallet_id,
            strategy_id = req.strategy_id,
            "engine_activate_ok"
        );
        Ok(())
    }

    async fn deactivate(&self, wallet_id: i64, strategy_id: i64) -> Result<(), EngineError> {
        let body = json!({ "wallet_id": wallet_id, "strategy_id": strategy_id });
        self.post(
            "/internal/strategy/deactivate",
            &body,
            "deactivate",
            wallet_id,
            strategy_id,
        )
        .await?;
        tracing::info!(wallet_id, strategy_id, "engine_deactivate_ok");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn stub_engine(
        status: axum::http::StatusCode,
    ) -> (String, tokio::task::JoinHandle<()>) {
        use axum::routing::post;
        let app = axum::Router::new()
            .route(
                "/internal/strategy/activate",
                post(move || async move { status }),
            )
            .route(
                "/internal/strategy/deactivate",
                post(move || async move { status }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), handle)
    }

    fn request() -> ActivateRequest {
        ActivateRequest {
            wallet_id: 3,
            strategy_id: 11,
            graph: serde_json::json!({"mode": "form"}),
            markets: vec!["btc-updown-15m".into()],
            max_position_usdc: 250.0,
            is_paper: true,
            private_key_enc: "opaque".into(),
            safe_address: "0xsafe".into(),
        }
    }

    #[tokio::test]
    async fn test_activate_2xx_is_ok() {
        let (url, server) = stub_engine(axum::http::StatusCode::OK).await;
        let client = EngineClient::new(reqwest::Client::new(), &url);
        assert!(client.activate(&request()).await.is_ok());
        assert!(client.deactivate(3, 11).await.is_ok());
        server.abort();
    }

    #[tokio::test]
    async fn test_non_2xx_carries_context() {
        let (url, server) = stub_engine(axum::http::StatusCode::SERVICE_UNAVAILABLE).await;
        let client = EngineClient::new(reqwest::Client::new(), &url);
        let err = client.activate(&request()).await.unwrap_err();
        assert_eq!(err.operation, "activate");
        assert_eq!(err.wallet_id, 3);
        assert_eq!(err.strategy_id, 11);
        assert!(matches!(err.kind, EngineErrorKind::Status(503)));
        server.abort();
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = EngineClient::new(reqwest::Client::new(), &format!("http://{addr}"));
        let err = client.deactivate(1, 2).await.unwrap_err();
        assert_eq!(err.operation, "deactivate");
        assert!(matches!(err.kind, EngineErrorKind::Transport(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = EngineClient::new(reqwest::Client::new(), "http://engine:8081/");
        assert_eq!(client.base_url, "http://engine:8081");
    }
}
