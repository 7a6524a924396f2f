//! Engine errors.

use crate::component::ComponentKind;
use thiserror::Error;

/// Errors raised while configuring the engine or creating components.
///
/// Interaction paths (dragging, pointer dispatch) never fail; stale targets
/// there are ignored instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),
    #[error("{kind:?} needs {expected} joints, found {found}")]
    JointCount {
        kind: ComponentKind,
        expected: usize,
        found: usize,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
