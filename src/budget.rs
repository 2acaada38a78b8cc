//! Budget Guard (§4.2): pre-call admission control over six ordered caps.
//! Checks run in a fixed order and the first failing check wins; at-cap is
//! admitted (strict `>` comparisons throughout).

use std::sync::RwLock;

use crate::domain::BudgetConfig;
use crate::errors::BudgetError;
use crate::ledger::CostLedger;

pub struct CallContext<'a> {
    pub estimated_cost_usd: f64,
    pub task_id: Option<&'a str>,
    pub cycle_spend_usd: f64,
    pub provider: &'a str,
}

pub struct BudgetGuard {
    budgets: RwLock<BudgetConfig>,
}

impl BudgetGuard {
    pub fn new(budgets: BudgetConfig) -> Self {
        Self {
            budgets: RwLock::new(budgets),
        }
    }

    pub fn update_budgets(&self, budgets: BudgetConfig) {
        *self.budgets.write().expect("budget lock poisoned") = budgets;
    }

    pub fn budgets(&self) -> BudgetConfig {
        self.budgets.read().expect("budget lock poisoned").clone()
    }

    /// Returns `Ok(())` if admitted, `Err(BudgetError{level, reason})` for
    /// the first cap exceeded in the fixed order (§4.2).
    pub fn check(&self, ledger: &CostLedger, ctx: &CallContext) -> Result<(), BudgetError> {
        let budgets = self.budgets.read().expect("budget lock poisoned");
        let estimated = ctx.estimated_cost_usd;

        if estimated > budgets.per_call_usd {
            return Err(BudgetError {
                level: "per_call",
                reason: format!(
                    "estimated {estimated:.4} exceeds per-call cap {:.4}",
                    budgets.per_call_usd
                ),
            });
        }

        if let Some(task_id) = ctx.task_id {
            let spent = ledger.cost_for_task(task_id);
            if spent + estimated > budgets.per_task_usd {
                return Err(BudgetError {
                    level: "per_task",
                    reason: format!(
                        "task spend {spent:.4} + estimated {estimated:.4} exceeds per-task cap {:.4}",
                        budgets.per_task_usd
                    ),
                });
            }
        }

        if ctx.cycle_spend_usd + estimated > budgets.per_cycle_usd {
            return Err(BudgetError {
                level: "per_cycle",
                reason: format!(
                    "cycle spend {:.4} + estimated {estimated:.4} exceeds per-cycle cap {:.4}",
                    ctx.cycle_spend_usd, budgets.per_cycle_usd
                ),
            });
        }

        let daily = ledger.daily_cost();
        if daily + estimated > budgets.daily_usd {
            return Err(BudgetError {
                level: "daily",
                reason: format!(
                    "daily spend {daily:.4} + estimated {estimated:.4} exceeds daily cap {:.4}",
                    budgets.daily_usd
                ),
            });
        }

        let weekly = ledger.weekly_cost();
        if weekly + estimated > budgets.weekly_usd {
            return Err(BudgetError {
                level: "weekly",
                reason: format!(
                    "weekly spend {weekly:.4} + estimated {estimated:.4} exceeds weekly cap {:.4}",
                    budgets.weekly_usd
                ),
            });
        }

        if let Some(&cap) = budgets.per_provider_daily_usd.get(ctx.provider)
            && cap > 0.0
        {
            let provider_spent = ledger.provider_daily_cost(ctx.provider);
            if provider_spent + estimated > cap {
                return Err(BudgetError {
                    level: "per_provider_daily",
                    reason: format!(
                        "{} daily spend {provider_spent:.4} + estimated {estimated:.4} exceeds cap {cap:.4}",
                        ctx.provider
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CostRecord;
    use chrono::Utc;
    use std::collections::HashMap;

    fn rec(provider: &str, task_id: Option<&str>, cost: f64) -> CostRecord {
        CostRecord {
            timestamp: Utc::now(),
            phase: "build".to_string(),
            task_id: task_id.map(|s| s.to_string()),
            provider: provider.to_string(),
            model: "m".to_string(),
            input_tokens: 0,
            output_tokens: 0,
            cost_usd: cost,
            latency_ms: 0,
        }
    }

    #[test]
    fn at_cap_is_admitted() {
        let guard = BudgetGuard::new(BudgetConfig {
            per_call_usd: 1.0,
            ..Default::default()
        });
        let ledger = CostLedger::new();
        let ctx = CallContext {
            estimated_cost_usd: 1.0,
            task_id: None,
            cycle_spend_usd: 0.0,
            provider: "openai",
        };
        assert!(guard.check(&ledger, &ctx).is_ok());
    }

    #[test]
    fn per_call_blocks_first() {
        let guard = BudgetGuard::new(BudgetConfig {
            per_call_usd: 0.01,
            ..Default::default()
        });
        let ledger = CostLedger::new();
        let ctx = CallContext {
            estimated_cost_usd: 0.05,
            task_id: None,
            cycle_spend_usd: 0.0,
            provider: "openai",
        };
        let err = guard.check(&ledger, &ctx).unwrap_err();
        assert_eq!(err.level, "per_call");
    }

    /// Scenario D from §8.2.
    #[test]
    fn cap_ordering_scenario_d() {
        let mut per_provider = HashMap::new();
        per_provider.insert("openai".to_string(), 5.0);
        let guard = BudgetGuard::new(BudgetConfig {
            per_call_usd: 0.5,
            per_task_usd: 5.0,
            per_cycle_usd: 20.0,
            daily_usd: 10.0,
            weekly_usd: 50.0,
            per_provider_daily_usd: per_provider,
        });
        let ledger = CostLedger::new();
        ledger.record(rec("openai", Some("t1"), 4.9));
        let ctx = CallContext {
            estimated_cost_usd: 1.0,
            task_id: Some("t1"),
            cycle_spend_usd: 19.5,
            provider: "openai",
        };
        let err = guard.check(&ledger, &ctx).unwrap_err();
        assert_eq!(err.level, "per_call");
    }

    #[test]
    fn per_provider_daily_skipped_when_no_entry() {
        let guard = BudgetGuard::new(BudgetConfig::default());
        let ledger = CostLedger::new();
        let ctx = CallContext {
            estimated_cost_usd: 0.0,
            task_id: None,
            cycle_spend_usd: 0.0,
            provider: "unregistered",
        };
        assert!(guard.check(&ledger, &ctx).is_ok());
    }

    #[test]
    fn per_provider_daily_skipped_when_cap_is_zero() {
        let mut per_provider = HashMap::new();
        per_provider.insert("openai".to_string(), 0.0);
        let guard = BudgetGuard::new(BudgetConfig {
            per_provider_daily_usd: per_provider,
            ..Default::default()
        });
        let ledger = CostLedger::new();
        let ctx = CallContext {
            estimated_cost_usd: 0.01,
            task_id: None,
            cycle_spend_usd: 0.0,
            provider: "openai",
        };
        assert!(guard.check(&ledger, &ctx).is_ok());
    }

    #[test]
    fn update_budgets_takes_effect_immediately() {
        let guard = BudgetGuard::new(BudgetConfig {
            per_call_usd: 100.0,
            ..Default::default()
        });
        let ledger = CostLedger::new();
        let ctx = CallContext {
            estimated_cost_usd: 1.0,
            task_id: None,
            cycle_spend_usd: 0.0,
            provider: "openai",
        };
        assert!(guard.check(&ledger, &ctx).is_ok());
        guard.update_budgets(BudgetConfig {
            per_call_usd: 0.1,
            ..Default::default()
        });
        assert!(guard.check(&ledger, &ctx).is_err());
    }
}
