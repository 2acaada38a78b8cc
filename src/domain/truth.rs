use serde::{Deserialize, Serialize};

/// Confidence an operator or phase should place in a knowledge-bearing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

/// Where a knowledge-bearing record sits between guess and fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthStatus {
    Verified,
    Hypothesis,
    Speculative,
    Implemented,
    Failed,
    Archived,
}

impl TruthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruthStatus::Verified => "verified",
            TruthStatus::Hypothesis => "hypothesis",
            TruthStatus::Speculative => "speculative",
            TruthStatus::Implemented => "implemented",
            TruthStatus::Failed => "failed",
            TruthStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "verified" => Some(TruthStatus::Verified),
            "hypothesis" => Some(TruthStatus::Hypothesis),
            "speculative" => Some(TruthStatus::Speculative),
            "implemented" => Some(TruthStatus::Implemented),
            "failed" => Some(TruthStatus::Failed),
            "archived" => Some(TruthStatus::Archived),
            _ => None,
        }
    }
}

/// `(truthStatus, confidence)` annotation attached to knowledge-bearing entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthLabel {
    pub truth_status: TruthStatus,
    pub confidence: Confidence,
}

impl TruthLabel {
    pub fn new(truth_status: TruthStatus, confidence: Confidence) -> Self {
        Self {
            truth_status,
            confidence,
        }
    }

    pub fn hypothesis_medium() -> Self {
        Self::new(TruthStatus::Hypothesis, Confidence::Medium)
    }

    pub fn implemented_medium() -> Self {
        Self::new(TruthStatus::Implemented, Confidence::Medium)
    }

    pub fn speculative_low() -> Self {
        Self::new(TruthStatus::Speculative, Confidence::Low)
    }
}
