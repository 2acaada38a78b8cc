//! The ten engine-loop states and the legal transitions among them (§4.9.1),
//! plus the eleven task states' terminal/DAG shape lives in `domain::task`.
//!
//! Grounded on the teacher's `orchestrator::state::StateManager`, which
//! likewise centralizes "what can follow what" rather than scattering the
//! checks across call sites.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Scanning,
    Planning,
    Building,
    ShipChecking,
    Evaluating,
    Paused,
    Error,
    AwaitingApproval,
    BudgetExceeded,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::Idle => "idle",
            LoopState::Scanning => "scanning",
            LoopState::Planning => "planning",
            LoopState::Building => "building",
            LoopState::ShipChecking => "ship_checking",
            LoopState::Evaluating => "evaluating",
            LoopState::Paused => "paused",
            LoopState::Error => "error",
            LoopState::AwaitingApproval => "awaiting_approval",
            LoopState::BudgetExceeded => "budget_exceeded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(LoopState::Idle),
            "scanning" => Some(LoopState::Scanning),
            "planning" => Some(LoopState::Planning),
            "building" => Some(LoopState::Building),
            "ship_checking" => Some(LoopState::ShipChecking),
            "evaluating" => Some(LoopState::Evaluating),
            "paused" => Some(LoopState::Paused),
            "error" => Some(LoopState::Error),
            "awaiting_approval" => Some(LoopState::AwaitingApproval),
            "budget_exceeded" => Some(LoopState::BudgetExceeded),
            _ => None,
        }
    }

    /// Is this a "transient" in-flight state that should never survive a
    /// process restart? Used by `Orchestrator::start` to reset a crashed
    /// EngineState back to idle (§4.8.1).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LoopState::Scanning
                | LoopState::Planning
                | LoopState::Building
                | LoopState::ShipChecking
                | LoopState::Evaluating
        )
    }

    fn legal_targets(&self) -> &'static [LoopState] {
        use LoopState::*;
        match self {
            Idle => &[Scanning, Paused],
            Scanning => &[Planning, Error, Paused, BudgetExceeded],
            Planning => &[Building, Error, Paused, BudgetExceeded],
            Building => &[ShipChecking, Error, Paused, BudgetExceeded, AwaitingApproval],
            ShipChecking => &[Evaluating, Error, Paused, BudgetExceeded],
            Evaluating => &[Idle, Error, Paused],
            Paused => &[Idle, Scanning, Planning, Building, ShipChecking, Evaluating],
            Error => &[Idle, Scanning, Paused],
            AwaitingApproval => &[Building, Paused, Error],
            BudgetExceeded => &[Idle, Paused],
        }
    }
}

/// §8.1 property 6: closure of the transition table.
pub fn can_transition(from: LoopState, to: LoopState) -> bool {
    from.legal_targets().contains(&to)
}

/// One of the five active phases; `None` covers the remaining five loop
/// states, which have no associated phase (§4.9.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Scan,
    Plan,
    Build,
    ShipCheck,
    Eval,
}

impl Phase {
    pub const ORDER: [Phase; 5] = [
        Phase::Scan,
        Phase::Plan,
        Phase::Build,
        Phase::ShipCheck,
        Phase::Eval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Scan => "scan",
            Phase::Plan => "plan",
            Phase::Build => "build",
            Phase::ShipCheck => "ship_check",
            Phase::Eval => "eval",
        }
    }

    pub fn loop_state(&self) -> LoopState {
        match self {
            Phase::Scan => LoopState::Scanning,
            Phase::Plan => LoopState::Planning,
            Phase::Build => LoopState::Building,
            Phase::ShipCheck => LoopState::ShipChecking,
            Phase::Eval => LoopState::Evaluating,
        }
    }
}

/// Bijective inverse of `Phase::loop_state`; `None` for the five loop states
/// with no corresponding phase (§8.1 property 7).
pub fn phase_for_state(state: LoopState) -> Option<Phase> {
    match state {
        LoopState::Scanning => Some(Phase::Scan),
        LoopState::Planning => Some(Phase::Plan),
        LoopState::Building => Some(Phase::Build),
        LoopState::ShipChecking => Some(Phase::ShipCheck),
        LoopState::Evaluating => Some(Phase::Eval),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_matches_table_exactly() {
        let all = [
            LoopState::Idle,
            LoopState::Scanning,
            LoopState::Planning,
            LoopState::Building,
            LoopState::ShipChecking,
            LoopState::Evaluating,
            LoopState::Paused,
            LoopState::Error,
            LoopState::AwaitingApproval,
            LoopState::BudgetExceeded,
        ];
        for &from in &all {
            for &to in &all {
                assert_eq!(can_transition(from, to), from.legal_targets().contains(&to));
            }
        }
    }

    #[test]
    fn phase_state_bijection() {
        for phase in Phase::ORDER {
            assert_eq!(phase_for_state(phase.loop_state()), Some(phase));
        }
    }

    #[test]
    fn idle_cannot_reach_building_directly() {
        assert!(!can_transition(LoopState::Idle, LoopState::Building));
    }

    #[test]
    fn awaiting_approval_transitions() {
        assert!(can_transition(LoopState::AwaitingApproval, LoopState::Building));
        assert!(!can_transition(LoopState::AwaitingApproval, LoopState::Scanning));
    }
}
