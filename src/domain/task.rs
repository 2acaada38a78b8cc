use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::truth::TruthLabel;

/// Risk/authority classification assigned by the tier resolver (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomyTier {
    T0,
    T1,
    T2,
}

impl AutonomyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutonomyTier::T0 => "0",
            AutonomyTier::T1 => "1",
            AutonomyTier::T2 => "2",
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(AutonomyTier::T0),
            1 => Some(AutonomyTier::T1),
            2 => Some(AutonomyTier::T2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Queued,
    Scanning,
    Planning,
    Building,
    Reviewing,
    AwaitingApproval,
    Approved,
    Rejected,
    Completed,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Scanning => "scanning",
            TaskState::Planning => "planning",
            TaskState::Building => "building",
            TaskState::Reviewing => "reviewing",
            TaskState::AwaitingApproval => "awaiting_approval",
            TaskState::Approved => "approved",
            TaskState::Rejected => "rejected",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(TaskState::Queued),
            "scanning" => Some(TaskState::Scanning),
            "planning" => Some(TaskState::Planning),
            "building" => Some(TaskState::Building),
            "reviewing" => Some(TaskState::Reviewing),
            "awaiting_approval" => Some(TaskState::AwaitingApproval),
            "approved" => Some(TaskState::Approved),
            "rejected" => Some(TaskState::Rejected),
            "completed" => Some(TaskState::Completed),
            "failed" => Some(TaskState::Failed),
            "cancelled" => Some(TaskState::Cancelled),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions (§4.9.2).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Cancelled | TaskState::Rejected
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Branch,
    Pr,
    File,
    Url,
    Log,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Branch => "branch",
            ArtifactType::Pr => "pr",
            ArtifactType::File => "file",
            ArtifactType::Url => "url",
            ArtifactType::Log => "log",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "branch" => Some(ArtifactType::Branch),
            "pr" => Some(ArtifactType::Pr),
            "file" => Some(ArtifactType::File),
            "url" => Some(ArtifactType::Url),
            "log" => Some(ArtifactType::Log),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_type: ArtifactType,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub objective_id: String,
    pub cycle_id: String,
    pub title: String,
    pub description: String,
    pub state: TaskState,
    pub autonomy_tier: AutonomyTier,
    pub budget_cap_usd: f64,
    pub actual_cost_usd: f64,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub truth_label: Option<TruthLabel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        objective_id: impl Into<String>,
        cycle_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        autonomy_tier: AutonomyTier,
        budget_cap_usd: f64,
        state: TaskState,
    ) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            objective_id: objective_id.into(),
            cycle_id: cycle_id.into(),
            title: title.into(),
            description: description.into(),
            state,
            autonomy_tier,
            budget_cap_usd,
            actual_cost_usd: 0.0,
            artifacts: Vec::new(),
            retry_count: 0,
            error: None,
            truth_label: Some(TruthLabel::hypothesis_medium()),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// `actualCostUsd` is monotonically non-decreasing until the task reaches
    /// a terminal state (§3 invariant).
    pub fn add_cost(&mut self, cost_usd: f64) {
        self.actual_cost_usd += cost_usd.max(0.0);
        self.updated_at = super::now();
    }

    pub fn transition(&mut self, to: TaskState) {
        self.state = to;
        self.updated_at = super::now();
        if to.is_terminal() && self.completed_at.is_none() && to == TaskState::Completed {
            self.completed_at = Some(self.updated_at);
        }
    }
}
