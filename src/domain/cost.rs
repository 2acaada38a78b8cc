use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hot-reloadable spend caps (§3, §4.2). A cap of 0 means no autonomous
/// spend is allowed for that provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub per_call_usd: f64,
    pub per_task_usd: f64,
    pub per_cycle_usd: f64,
    pub daily_usd: f64,
    pub weekly_usd: f64,
    #[serde(default)]
    pub per_provider_daily_usd: HashMap<String, f64>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            per_call_usd: 1.0,
            per_task_usd: 5.0,
            per_cycle_usd: 20.0,
            daily_usd: 50.0,
            weekly_usd: 200.0,
            per_provider_daily_usd: HashMap::new(),
        }
    }
}

/// Immutable record of one billable call; appended by the Phase Executor,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRecord {
    pub timestamp: DateTime<Utc>,
    pub phase: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub provider: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub latency_ms: u64,
}
