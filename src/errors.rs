//! Typed error hierarchy for the orchestrator.
//!
//! Five enums cover the error kinds named in §7: `ConfigError` folds in
//! both ConfigurationError and ValidationError (both are rejected at the
//! boundary with no state change), `PreconditionError`, `BudgetError`
//! (carries the guard's level + reason), `AdapterError`, `StateError`.

use thiserror::Error;

use crate::state_machine::LoopState;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid mode '{0}': expected simulation, selective, or live")]
    InvalidMode(String),

    #[error("invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("failed to read config at {path}: {source}")]
    ReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("failed to write config at {path}: {source}")]
    WriteFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("Cannot trigger: engine is {0}")]
    EngineBusy(String),

    #[error("no active objectives")]
    NoActiveObjectives,

    #[error("not found or not awaiting approval")]
    NotAwaitingApproval,

    #[error("{0}")]
    Other(String),
}

/// Budget Guard rejection; `level` is one of the six ordered caps (§4.2).
#[derive(Debug, Error)]
#[error("budget blocked at {level}: {reason}")]
pub struct BudgetError {
    pub level: &'static str,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to spawn adapter process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("adapter process exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("adapter timed out after {0}ms")]
    Timeout(u64),

    #[error("failed to parse adapter response: {0}")]
    ParseFailed(String),

    #[error("adapter returned an error: {0}")]
    Remote(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: LoopState, to: LoopState },
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Umbrella enum so phase executors and the orchestrator can propagate any
/// of the above with `?` while still matching on kind where it matters.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_error_carries_level_and_reason() {
        let err = BudgetError {
            level: "per_call",
            reason: "estimated 0.05 exceeds cap 0.01".to_string(),
        };
        assert_eq!(err.level, "per_call");
        assert!(err.to_string().contains("per_call"));
    }

    #[test]
    fn precondition_engine_busy_formats_state() {
        let err = PreconditionError::EngineBusy("scanning".to_string());
        assert_eq!(err.to_string(), "Cannot trigger: engine is scanning");
    }

    #[test]
    fn state_error_illegal_transition_displays_both_states() {
        let err = StateError::IllegalTransition {
            from: LoopState::Idle,
            to: LoopState::Building,
        };
        assert!(err.to_string().contains("idle"));
        assert!(err.to_string().contains("building"));
    }

    #[test]
    fn engine_error_converts_from_each_kind() {
        let e: EngineError = PreconditionError::NoActiveObjectives.into();
        assert!(matches!(e, EngineError::Precondition(_)));
        let e: EngineError = AdapterError::Timeout(5000).into();
        assert!(matches!(e, EngineError::Adapter(_)));
    }
}
