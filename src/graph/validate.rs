use serde::Serialize;

/// A single validation failure, anchored to the offending field so the
/// editor can point at it (e.g. `conditions[1].rules[0].indicator`).
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
