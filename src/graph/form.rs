use uuid::Uuid;

use super::validate::ValidationError;
use super::{Action, FormGraph, Risk, Rule};

// ---------------------------------------------------------------------------
// Allow-lists
// ---------------------------------------------------------------------------

/// The stateless tick fields the engine exposes to form-mode rules.
pub const INDICATORS: [&str; 18] = [
    "abs_move_pct",
    "dir_move_pct",
    "spread_up",
    "spread_down",
    "size_ratio_up",
    "size_ratio_down",
    "pct_into_slot",
    "minutes_into_slot",
    "mid_up",
    "mid_down",
    "bid_up",
    "ask_up",
    "bid_down",
    "ask_down",
    "bid_size_up",
    "ask_size_up",
    "bid_size_down",
    "ask_size_down",
];

pub const OPERATORS: [&str; 7] = [">", "<", ">=", "<=", "==", "!=", "between"];

// ---------------------------------------------------------------------------
// Validation — fail-fast, first violation wins
// ---------------------------------------------------------------------------

/// Validate a form graph against the rule grammar.
///
/// Stops at the first violation; the error carries the path of the
/// offending field. Mutates nothing — id assignment is a separate step
/// (`assign_ids`), run only after validation succeeds.
pub fn validate_form(graph: &FormGraph) -> Result<(), ValidationError> {
    if graph.conditions.is_empty() {
        return Err(ValidationError::new(
            "conditions",
            "at least one condition group is required",
        ));
    }

    for (gi, group) in graph.conditions.iter().enumerate() {
        if group.rules.is_empty() {
            return Err(ValidationError::new(
                format!("conditions[{gi}].rules"),
                "condition group must contain at least one rule",
            ));
        }
        for (ri, rule) in group.rules.iter().enumerate() {
            validate_rule(rule, &format!("conditions[{gi}].rules[{ri}]"))?;
        }
    }

    validate_action(&graph.action)?;
    validate_risk(&graph.risk)?;
    Ok(())
}

fn validate_rule(rule: &Rule, path: &str) -> Result<(), ValidationError> {
    if !INDICATORS.contains(&rule.indicator.as_str()) {
        return Err(ValidationError::new(
            format!("{path}.indicator"),
            format!("unknown indicator '{}'", rule.indicator),
        ));
    }

    if !OPERATORS.contains(&rule.operator.as_str()) {
        return Err(ValidationError::new(
            format!("{path}.operator"),
            format!("unknown operator '{}'", rule.operator),
        ));
    }

    // `between` takes [lo, hi]; every other operator takes a scalar
    if rule.operator == "between" {
        let bounds = rule.value.as_array();
        let ok = bounds.is_some_and(|arr| arr.len() == 2 && arr.iter().all(|v| v.as_f64().is_some()));
        if !ok {
            return Err(ValidationError::new(
                format!("{path}.value"),
                "'between' requires an array of exactly two numbers",
            ));
        }
    } else if rule.value.as_f64().is_none() {
        return Err(ValidationError::new(
            format!("{path}.value"),
            format!("operator '{}' requires a numeric value", rule.operator),
        ));
    }

    Ok(())
}

fn validate_action(action: &Action) -> Result<(), ValidationError> {
    if !matches!(action.signal.as_str(), "buy" | "sell") {
        return Err(ValidationError::new(
            "action.signal",
            "signal must be 'buy' or 'sell'",
        ));
    }
    if !matches!(action.outcome.as_str(), "UP" | "DOWN") {
        return Err(ValidationError::new(
            "action.outcome",
            "outcome must be 'UP' or 'DOWN'",
        ));
    }
    if !matches!(action.size_mode.as_str(), "fixed" | "proportional") {
        return Err(ValidationError::new(
            "action.size_mode",
            "size_mode must be 'fixed' or 'proportional'",
        ));
    }
    if action.size_usdc < 1.0 {
        return Err(ValidationError::new(
            "action.size_usdc",
            "size_usdc must be at least 1",
        ));
    }
    if !matches!(action.order_type.as_str(), "market" | "limit") {
        return Err(ValidationError::new(
            "action.order_type",
            "order_type must be 'market' or 'limit'",
        ));
    }
    Ok(())
}

fn validate_risk(risk: &Risk) -> Result<(), ValidationError> {
    if risk.max_position_usdc < 1.0 {
        return Err(ValidationError::new(
            "risk.max_position_usdc",
            "max_position_usdc must be at least 1",
        ));
    }
    if risk.max_trades_per_slot < 1.0 {
        return Err(ValidationError::new(
            "risk.max_trades_per_slot",
            "max_trades_per_slot must be at least 1",
        ));
    }

    let optional = [
        ("risk.stoploss_pct", risk.stoploss_pct),
        ("risk.take_profit_pct", risk.take_profit_pct),
        ("risk.daily_loss_limit_usdc", risk.daily_loss_limit_usdc),
        ("risk.cooldown_seconds", risk.cooldown_seconds),
    ];
    for (path, value) in optional {
        if let Some(v) = value {
            if v <= 0.0 {
                return Err(ValidationError::new(path, "must be greater than 0"));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Id normalization — idempotent, run only after validation succeeds
// ---------------------------------------------------------------------------

/// Assign a fresh UUID to every condition group and rule missing one.
/// Existing ids are preserved verbatim, so re-running on an already
/// normalized graph changes nothing.
pub fn assign_ids(graph: &mut FormGraph) {
    for group in &mut graph.conditions {
        if group.id.as_deref().is_none_or(str::is_empty) {
            group.id = Some(Uuid::new_v4().to_string());
        }
        for rule in &mut group.rules {
            if rule.id.as_deref().is_none_or(str::is_empty) {
                rule.id = Some(Uuid::new_v4().to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
