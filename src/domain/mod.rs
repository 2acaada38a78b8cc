//! Core data model: objectives, tasks, cycles and the knowledge-bearing
//! records each phase produces.
//!
//! Mirrors the shape the teacher uses for its factory entities
//! (`factory::models`): plain serde structs, `snake_case` enums with
//! explicit `as_str`/`from_str` pairs instead of relying solely on serde's
//! rename, and ids that are stable across save/load round-trips.

mod cost;
mod cycle;
mod objective;
mod task;
mod truth;

pub use cost::{BudgetConfig, CostRecord};
pub use cycle::{
    Complexity, Cycle, CycleState, EvalMetrics, Evaluation, Finding, PhaseTiming, Period, Plan,
    Priority, ProposedTask, Recommendation, RecommendationPriority, Run, Scan, Strategy,
};
pub use objective::{Objective, ObjectiveStatus, ObjectiveUpdate};
pub use task::{Artifact, ArtifactType, AutonomyTier, Task, TaskState};
pub use truth::{Confidence, TruthLabel, TruthStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Allocate a fresh stable identifier the way every entity in this model needs one.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Process-wide engine state, durably snapshotted between cycles.
///
/// Exactly one `loopState` at a time; `totalCyclesCompleted` only increments
/// on successful cycle finalization (§3, §4.8.3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineState {
    pub loop_state: crate::state_machine::LoopState,
    #[serde(default)]
    pub current_cycle_id: Option<String>,
    #[serde(default)]
    pub current_phase: Option<String>,
    #[serde(default)]
    pub current_task_id: Option<String>,
    #[serde(default)]
    pub last_cycle_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_cycle_scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_cycles_completed: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            loop_state: crate::state_machine::LoopState::Idle,
            current_cycle_id: None,
            current_phase: None,
            current_task_id: None,
            last_cycle_completed_at: None,
            next_cycle_scheduled_at: None,
            total_cycles_completed: 0,
            error: None,
        }
    }
}

/// Append-only audit record: why a decision was made during a cycle.
///
/// Not named with fields in spec.md §3 ("see §6"); grounded the way the
/// teacher's `audit::logger::PhaseAudit` records a phase's reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub id: String,
    pub cycle_id: String,
    pub phase: String,
    pub summary: String,
    pub rationale: String,
    #[serde(default)]
    pub related_task_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only audit record: a hypothesis tried and its observed outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentLogEntry {
    pub id: String,
    pub cycle_id: String,
    pub objective_id: String,
    pub hypothesis: String,
    pub outcome: String,
    pub confidence: Confidence,
    pub timestamp: DateTime<Utc>,
}
