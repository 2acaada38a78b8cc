use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl ObjectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveStatus::Active => "active",
            ObjectiveStatus::Paused => "paused",
            ObjectiveStatus::Completed => "completed",
            ObjectiveStatus::Abandoned => "abandoned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ObjectiveStatus::Active),
            "paused" => Some(ObjectiveStatus::Paused),
            "completed" => Some(ObjectiveStatus::Completed),
            "abandoned" => Some(ObjectiveStatus::Abandoned),
            _ => None,
        }
    }
}

/// A user-declared goal. Created and mutated by the operator; the core
/// never deletes one (`objectives.delete` is an operator-facing control
/// operation but the core holds no opinion on when it's appropriate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub weight: f64,
    pub status: ObjectiveStatus,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Objective {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = super::now();
        Self {
            id: super::new_id(),
            title: title.into(),
            description: description.into(),
            weight: 1.0,
            status: ObjectiveStatus::Active,
            acceptance_criteria: Vec::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Weight is always clamped into `[0,1]` on write (§3).
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight.clamp(0.0, 1.0);
        self.updated_at = super::now();
    }

    pub fn is_active(&self) -> bool {
        self.status == ObjectiveStatus::Active
    }

    /// Applies an `objectives.update` edit set (§6.3). Only `Some` fields
    /// are touched; weight always goes through `set_weight` so the clamp
    /// invariant holds regardless of caller.
    pub fn apply_update(&mut self, edit: ObjectiveUpdate) {
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(status) = edit.status {
            self.status = status;
        }
        if let Some(acceptance_criteria) = edit.acceptance_criteria {
            self.acceptance_criteria = acceptance_criteria;
        }
        if let Some(tags) = edit.tags {
            self.tags = tags;
        }
        if let Some(weight) = edit.weight {
            self.set_weight(weight);
        } else {
            self.updated_at = super::now();
        }
    }
}

/// Partial edit set for the `objectives.update` control-surface op.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weight: Option<f64>,
    pub status: Option<ObjectiveStatus>,
    pub acceptance_criteria: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}
