//! Advisory budget suggestions (SPEC_FULL.md §4, "Pattern-informed budget
//! suggestions"). Read-only: looks at the Cost Ledger's historical
//! per-phase spend and proposes `BudgetConfig` adjustments with a
//! confidence score. Never writes `BudgetConfig` itself — a human applies
//! it via `config.set`.
//!
//! Grounded on the teacher's `patterns::budget_suggester`, which derives a
//! suggestion from observed historical spend rather than a fixed formula;
//! simplified here to per-phase and per-provider averages since the core
//! has no project-tag similarity concept to weight against.

use serde::Serialize;

use crate::domain::{BudgetConfig, CostRecord};

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSuggestion {
    pub suggested: BudgetConfig,
    pub confidence: f64,
    pub rationale: String,
}

const SAFETY_MARGIN: f64 = 1.25;
const MIN_SAMPLE_FOR_HIGH_CONFIDENCE: usize = 20;

/// Suggests caps wide enough to cover observed peak spend with headroom.
/// Confidence grows with sample size and caps at 0.9 (this is advisory
/// pattern-matching, never treated as certain).
pub fn suggest_budget_caps(records: &[CostRecord], current: &BudgetConfig) -> BudgetSuggestion {
    if records.is_empty() {
        return BudgetSuggestion {
            suggested: current.clone(),
            confidence: 0.0,
            rationale: "no historical spend to learn from".to_string(),
        };
    }

    let max_call = records.iter().map(|r| r.cost_usd).fold(0.0_f64, f64::max);
    let mut per_task: std::collections::HashMap<&str, f64> = std::collections::HashMap::new();
    for r in records {
        if let Some(task_id) = &r.task_id {
            *per_task.entry(task_id.as_str()).or_insert(0.0) += r.cost_usd;
        }
    }
    let max_task = per_task.values().cloned().fold(0.0_f64, f64::max);

    let total = records.iter().map(|r| r.cost_usd).sum::<f64>();
    let mut per_provider: std::collections::HashMap<&str, f64> = std::collections::HashMap::new();
    for r in records {
        *per_provider.entry(r.provider.as_str()).or_insert(0.0) += r.cost_usd;
    }
    let suggested_per_provider = per_provider
        .into_iter()
        .map(|(provider, spend)| (provider.to_string(), (spend * SAFETY_MARGIN).max(current.per_call_usd)))
        .collect();

    let suggested = BudgetConfig {
        per_call_usd: (max_call * SAFETY_MARGIN).max(current.per_call_usd),
        per_task_usd: (max_task * SAFETY_MARGIN).max(current.per_task_usd),
        per_cycle_usd: current.per_cycle_usd.max(total * SAFETY_MARGIN / 10.0),
        daily_usd: current.daily_usd,
        weekly_usd: current.weekly_usd,
        per_provider_daily_usd: suggested_per_provider,
    };

    let confidence = (records.len() as f64 / MIN_SAMPLE_FOR_HIGH_CONFIDENCE as f64).min(0.9);

    BudgetSuggestion {
        suggested,
        confidence,
        rationale: format!(
            "derived from {} historical records; peak call {:.4}, peak task {:.4}",
            records.len(),
            max_call,
            max_task
        ),
    }
}
