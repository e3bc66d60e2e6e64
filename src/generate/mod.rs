mod prompt;

use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::graph::validate::ValidationError;
use crate::graph::{FormGraph, StrategyGraph};

pub use prompt::SYSTEM_PROMPT;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation provider returned status {status}")]
    Api { status: u16 },
    #[error("generation provider returned no parsable JSON object: {snippet}")]
    InvalidJson { snippet: String },
    #[error("generated graph failed validation: {0}")]
    Validation(#[from] ValidationError),
    #[error("generation provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Provider response shape
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Converts a natural-language strategy description into a validated,
/// normalized form graph via a single text-generation call.
///
/// One provider call, one parse attempt, no retries — a failure is
/// surfaced to the caller, who decides whether to offer "try again".
#[derive(Clone)]
pub struct Generator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl Generator {
    pub fn new(client: reqwest::Client, cfg: &Config) -> Self {
        Self {
            client,
            api_url: cfg.generation_api_url.clone(),
            api_key: cfg.generation_api_key.clone(),
            model: cfg.generation_model.clone(),
            max_tokens: cfg.generation_max_tokens,
        }
    }

    /// Description length (10–1000 chars) is checked by the caller.
    pub async fn generate(&self, description: &str) -> Result<FormGraph, GenerateError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": description }],
        });

        let resp = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GenerateError::Api {
                status: status.as_u16(),
            });
        }

        let parsed: ProviderResponse = resp.json().await?;
        let text = parsed
            .content
            .first()
            .map(|block| block.text.as_str())
            .unwrap_or("");

        let graph = parse_graph(text)?;
        tracing::info!(
            groups = graph.conditions.len(),
            "strategy_generated"
        );
        Ok(graph)
    }
}

/// Parse the provider's reply into a validated, id-normalized form graph.
fn parse_graph(text: &str) -> Result<FormGraph, GenerateError> {
    let stripped = strip_code_fence(text);

    let value: serde_json::Value = serde_json::from_str(stripped)
        .map_err(|_| invalid_json(stripped))?;
    if !value.is_object() {
        return Err(invalid_json(stripped));
    }

    // A well-formed JSON object that is not a form graph is a validation
    // failure, not a parse failure.
    let graph: StrategyGraph = serde_json::from_value(value)
        .map_err(|e| ValidationError::new("$", e.to_string()))?;
    let StrategyGraph::Form(mut form) = graph else {
        return Err(ValidationError::new("mode", "generated graph must use form mode").into());
    };

    crate::graph::form::validate_form(&form)?;
    crate::graph::form::assign_ids(&mut form);
    Ok(form)
}

fn invalid_json(text: &str) -> GenerateError {
    let snippet: String = text.chars().take(120).collect();
    GenerateError::InvalidJson { snippet }
}

/// Strip a single leading/trailing Markdown code fence (``` or ```json).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_json() -> String {
        serde_json::json!({
            "mode": "form",
            "conditions": [{
                "type": "AND",
                "rules": [{ "indicator": "abs_move_pct", "operator": ">", "value": 0.5 }]
            }],
            "action": {
                "signal": "buy", "outcome": "UP", "size_mode": "fixed",
                "size_usdc": 50, "order_type": "market"
            },
            "risk": { "max_position_usdc": 100, "max_trades_per_slot": 1 }
        })
        .to_string()
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```json\n{\"a\":1}\n```  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_plain_json() {
        let graph = parse_graph(&graph_json()).unwrap();
        assert_eq!(graph.conditions.len(), 1);
        // ids were normalized on the way out
        assert!(graph.conditions[0].id.is_some());
        assert!(graph.conditions[0].rules[0].id.is_some());
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", graph_json());
        assert!(parse_graph(&fenced).is_ok());
    }

    #[test]
    fn test_prose_is_invalid_json() {
        let err = parse_graph("Sure! Here's a strategy you could use.").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidJson { .. }));
    }

    #[test]
    fn test_json_array_is_invalid_json() {
        let err = parse_graph("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidJson { .. }));
    }

    #[test]
    fn test_snippet_is_truncated() {
        let long = "x".repeat(500);
        let GenerateError::InvalidJson { snippet } = parse_graph(&long).unwrap_err() else {
            panic!("expected InvalidJson");
        };
        assert_eq!(snippet.chars().count(), 120);
    }

    #[test]
    fn test_missing_risk_field_is_validation_failure() {
        let body = serde_json::json!({
            "mode": "form",
            "conditions": [{
                "type": "AND",
                "rules": [{ "indicator": "abs_move_pct", "operator": ">", "value": 0.5 }]
            }],
            "action": {
                "signal": "buy", "outcome": "UP", "size_mode": "fixed",
                "size_usdc": 50, "order_type": "market"
            },
            "risk": { "max_position_usdc": 100 }
        })
        .to_string();
        let err = parse_graph(&body).unwrap_err();
        match err {
            GenerateError::Validation(v) => assert_eq!(v.path, "risk.max_trades_per_slot"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_node_mode_reply_rejected() {
        let body = serde_json::json!({"mode": "node", "nodes": [], "edges": []}).to_string();
        let err = parse_graph(&body).unwrap_err();
        match err {
            GenerateError::Validation(v) => assert_eq!(v.path, "mode"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_prompt_mentions_every_indicator() {
        for indicator in crate::graph::form::INDICATORS {
            assert!(
                SYSTEM_PROMPT.contains(indicator),
                "prompt is missing indicator {indicator}"
            );
        }
    }

    // ── Provider-level tests against a stub HTTP server ──

    async fn stub_provider(
        status: axum::http::StatusCode,
        body: serde_json::Value,
    ) -> (String, tokio::task::JoinHandle<()>) {
        use axum::routing::post;
        let app = axum::Router::new().route(
            "/v1/messages",
            post(move || {
                let body = body.clone();
                async move { (status, axum::Json(body)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1/messages"), handle)
    }

    fn test_generator(api_url: String) -> Generator {
        Generator {
            client: reqwest::Client::new(),
            api_url,
            api_key: "test-key".into(),
            model: "test-model".into(),
            max_tokens: 1024,
        }
    }

    #[tokio::test]
    async fn test_generate_happy_path() {
        let reply = serde_json::json!({
            "content": [{ "type": "text", "text": format!("```json\n{}\n```", graph_json()) }]
        });
        let (url, server) = stub_provider(axum::http::StatusCode::OK, reply).await;
        let graph = test_generator(url).generate("buy up on momentum").await.unwrap();
        assert_eq!(graph.action.signal, "buy");
        assert!(graph.conditions[0].rules[0].id.is_some());
        server.abort();
    }

    #[tokio::test]
    async fn test_generate_maps_500_to_api_error() {
        let (url, server) = stub_provider(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"error": "overloaded"}),
        )
        .await;
        let err = test_generator(url).generate("anything").await.unwrap_err();
        match err {
            GenerateError::Api { status } => assert_eq!(status, 500),
            other => panic!("expected Api, got {other:?}"),
        }
        server.abort();
    }

    #[tokio::test]
    async fn test_generate_maps_prose_to_invalid_json() {
        let reply = serde_json::json!({
            "content": [{ "type": "text", "text": "I can't help with that." }]
        });
        let (url, server) = stub_provider(axum::http::StatusCode::OK, reply).await;
        let err = test_generator(url).generate("anything").await.unwrap_err();
        assert!(matches!(err, GenerateError::InvalidJson { .. }));
        server.abort();
    }

    #[tokio::test]
    async fn test_generate_unreachable_is_transport_error() {
        // bind-then-drop guarantees nothing is listening on the port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = test_generator(format!("http://{addr}/v1/messages"))
            .generate("anything")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Transport(_)));
    }
}
