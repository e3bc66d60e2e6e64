pub mod form;
pub mod safety;
pub mod validate;

use serde::{Deserialize, Serialize};

use validate::ValidationError;

/// A strategy's rule set in one of its two authoring representations.
///
/// The `mode` tag is the discriminant: form graphs carry the flat
/// condition-group grammar, node graphs carry the visual editor's
/// node/edge structure. Each mode has its own validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum StrategyGraph {
    Form(FormGraph),
    Node(NodeGraph),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormGraph {
    #[serde(default)]
    pub conditions: Vec<ConditionGroup>,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub risk: Risk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// "AND" or "OR". The engine treats anything unrecognized as AND.
    #[serde(rename = "type", default = "default_group_type")]
    pub kind: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_group_type() -> String {
    "AND".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub indicator: String,
    #[serde(default)]
    pub operator: String,
    /// Scalar for ordinary operators, `[lo, hi]` for `between`.
    /// Shape is enforced by the form validator, not the type.
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub size_mode: String,
    #[serde(default)]
    pub size_usdc: f64,
    #[serde(default)]
    pub order_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default)]
    pub max_position_usdc: f64,
    #[serde(default)]
    pub max_trades_per_slot: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoploss_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_loss_limit_usdc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(default)]
    pub id: String,
    /// input | indicator | comparator | logic | action | api_fetch | ...
    /// The node vocabulary is owned by the engine; this plane only
    /// inspects `api_fetch` nodes for safety.
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<NodePosition>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
}

/// Validation outcome for a whole graph. The two validators report
/// differently on purpose: the form validator stops at the first
/// violation, the safety validator reports every offending node so the
/// editor can highlight them all at once.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    #[error("{0}")]
    Form(ValidationError),
    #[error("{} safety violation(s)", .0.len())]
    Safety(Vec<ValidationError>),
}

impl StrategyGraph {
    /// Validate the graph against the rules for its mode.
    pub fn validate(&self) -> Result<(), GraphError> {
        match self {
            Self::Form(g) => form::validate_form(g).map_err(GraphError::Form),
            Self::Node(g) => safety::validate_api_fetch_nodes(g).map_err(GraphError::Safety),
        }
    }

    /// Assign ids to form condition groups and rules that lack one.
    /// Idempotent; a no-op for node graphs, whose ids come from the editor.
    pub fn normalize(&mut self) {
        if let Self::Form(g) = self {
            form::assign_ids(g);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tag_selects_variant() {
        let graph: StrategyGraph = serde_json::from_value(serde_json::json!({
            "mode": "form",
            "conditions": [],
            "action": {},
            "risk": {}
        }))
        .unwrap();
        assert!(matches!(graph, StrategyGraph::Form(_)));

        let graph: StrategyGraph = serde_json::from_value(serde_json::json!({
            "mode": "node",
            "nodes": [],
            "edges": []
        }))
        .unwrap();
        assert!(matches!(graph, StrategyGraph::Node(_)));
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        let result: Result<StrategyGraph, _> =
            serde_json::from_value(serde_json::json!({"mode": "spreadsheet"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_tag_survives_serialization() {
        let graph = StrategyGraph::Node(NodeGraph {
            nodes: vec![],
            edges: vec![],
        });
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["mode"], "node");
    }

    #[test]
    fn test_missing_action_fields_default_to_empty() {
        let graph: FormGraph = serde_json::from_value(serde_json::json!({
            "conditions": [{"type": "AND", "rules": []}]
        }))
        .unwrap();
        assert_eq!(graph.action.signal, "");
        assert!((graph.action.size_usdc).abs() < f64::EPSILON);
        assert!(graph.risk.stoploss_pct.is_none());
    }
}
