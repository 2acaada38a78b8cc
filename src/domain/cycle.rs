use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::truth::TruthLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Running,
    Completed,
    Failed,
    Paused,
}

impl CycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleState::Running => "running",
            CycleState::Completed => "completed",
            CycleState::Failed => "failed",
            CycleState::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PhaseTiming {
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// One full pass through the five-phase pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub id: String,
    pub number: u64,
    pub state: CycleState,
    pub mode: String,
    #[serde(default)]
    pub phase_timings: HashMap<String, PhaseTiming>,
    pub total_cost_usd: f64,
    pub tasks_created: u64,
    pub tasks_completed: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Cycle {
    pub fn new(number: u64, mode: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            number,
            state: CycleState::Running,
            mode: mode.into(),
            phase_timings: HashMap::new(),
            total_cost_usd: 0.0,
            tasks_created: 0,
            tasks_completed: 0,
            started_at: super::now(),
            completed_at: None,
        }
    }

    pub fn start_phase(&mut self, phase: &str) {
        self.phase_timings.entry(phase.to_string()).or_default().started_at = Some(super::now());
    }

    pub fn complete_phase(&mut self, phase: &str, cost_usd: f64) {
        self.phase_timings.entry(phase.to_string()).or_default().completed_at = Some(super::now());
        self.total_cost_usd += cost_usd.max(0.0);
    }

    pub fn finalize(&mut self, success: bool) {
        self.state = if success {
            CycleState::Completed
        } else {
            CycleState::Failed
        };
        self.completed_at = Some(super::now());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub summary: String,
    #[serde(default)]
    pub relevance: f64,
    #[serde(default)]
    pub sources: Vec<String>,
    pub truth_label: TruthLabel,
}

/// Produced by SCAN, consumed by PLAN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub id: String,
    pub cycle_id: String,
    pub objective_ids: Vec<String>,
    pub findings: Vec<Finding>,
    pub cost_usd: f64,
    pub tokens: u64,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Trivial,
    Small,
    Medium,
    Large,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Trivial => "trivial",
            Complexity::Small => "small",
            Complexity::Medium => "medium",
            Complexity::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedTask {
    pub title: String,
    pub description: String,
    pub estimated_complexity: Complexity,
    pub suggested_tier: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Priority {
    pub objective_id: String,
    pub rationale: String,
    pub proposed_tasks: Vec<ProposedTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub summary: String,
    pub priorities: Vec<Priority>,
}

/// Produced by PLAN, consumed by BUILD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub cycle_id: String,
    pub scan_id: String,
    pub strategy: Strategy,
    pub created_at: DateTime<Utc>,
}

/// One Run per external call that produces a record-of artifact. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub cycle_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub phase: String,
    pub provider: String,
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub response: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub tokens: u64,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

impl RecommendationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationPriority::Low => "low",
            RecommendationPriority::Medium => "medium",
            RecommendationPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub priority: RecommendationPriority,
    pub truth_label: TruthLabel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub total_cost_usd: f64,
    pub avg_task_latency_ms: f64,
    #[serde(default)]
    pub objective_progress: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One per cycle; produced by EVAL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: String,
    pub cycle_id: String,
    pub period: Period,
    pub metrics: EvalMetrics,
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}
