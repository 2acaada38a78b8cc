//! Phase Executor (§4.6): turns the current cycle + inputs into a phase
//! result, charging costs through the Cost Ledger and gated by the Budget
//! Guard. Grounded on the teacher's `review::dispatcher::dispatch` /
//! `parse_review_output` (untrusted-response parsing discipline: coerce,
//! clamp, fall back, never fail the whole phase on a parse error) and
//! `factory::planner::PlanResponse::parse`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::adapter::GenerateRequest;
use crate::budget::{BudgetGuard, CallContext};
use crate::domain::{
    Artifact, ArtifactType, AutonomyTier, Complexity, Confidence, CostRecord, Cycle, EvalMetrics,
    Evaluation, Finding, Objective, Period, Plan, Priority, ProposedTask, Recommendation,
    RecommendationPriority, Run, Scan, Strategy, Task, TaskState, TruthLabel, TruthStatus,
};
use crate::ledger::CostLedger;
use crate::router::Role;
use crate::router::Router;
use crate::store::Store;
use crate::tier;

const SCAN_ESTIMATED_COST_USD: f64 = 0.02;
const PLAN_ESTIMATED_COST_USD: f64 = 0.03;
const BUILD_ESTIMATED_COST_USD: f64 = 0.10;
const SHIP_CHECK_ESTIMATED_COST_USD: f64 = 0.05;
const EVAL_ESTIMATED_COST_USD: f64 = 0.02;

const MAX_PROPOSED_TASKS_PER_PRIORITY: usize = 5;
const MAX_PROPOSED_TASKS_TOTAL: usize = 10;

/// Handoff local to one cycle; never persisted, reset at the end of EVAL
/// (§4.6, §9 "Inter-phase state").
#[derive(Default)]
pub struct CycleContext {
    pub last_scan: Option<Scan>,
    pub last_plan: Option<Plan>,
    pub last_tasks: Vec<Task>,
}

pub struct PhaseResult {
    pub success: bool,
    pub cost_usd: f64,
    pub error: Option<String>,
    pub tasks_created: u64,
    pub tasks_completed: u64,
}

impl PhaseResult {
    fn blocked(reason: String) -> Self {
        Self {
            success: false,
            cost_usd: 0.0,
            error: Some(reason),
            tasks_created: 0,
            tasks_completed: 0,
        }
    }
}

pub struct PhaseExecutor {
    router: Arc<Router>,
    ledger: Arc<CostLedger>,
    guard: Arc<BudgetGuard>,
    store: Arc<dyn Store>,
}

impl PhaseExecutor {
    pub fn new(
        router: Arc<Router>,
        ledger: Arc<CostLedger>,
        guard: Arc<BudgetGuard>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            router,
            ledger,
            guard,
            store,
        }
    }

    async fn active_objectives(&self) -> Vec<Objective> {
        self.store
            .list_objectives()
            .await
            .into_iter()
            .filter(Objective::is_active)
            .collect()
    }

    fn record_cost(&self, phase: &str, task_id: Option<&str>, provider: &str, model: &str, cost_usd: f64, tokens: (u64, u64), latency_ms: u64) {
        self.ledger.record(CostRecord {
            timestamp: crate::domain::now(),
            phase: phase.to_string(),
            task_id: task_id.map(|s| s.to_string()),
            provider: provider.to_string(),
            model: model.to_string(),
            input_tokens: tokens.0,
            output_tokens: tokens.1,
            cost_usd,
            latency_ms,
        });
    }

    pub async fn run_scan(&self, cycle: &Cycle) -> (PhaseResult, Option<Scan>) {
        let objectives = self.active_objectives().await;
        if objectives.is_empty() {
            return (
                PhaseResult::blocked("no active objectives".to_string()),
                None,
            );
        }

        let assignment = self.router.get_adapter(Role::Research);
        let ctx = CallContext {
            estimated_cost_usd: SCAN_ESTIMATED_COST_USD,
            task_id: None,
            cycle_spend_usd: cycle.total_cost_usd,
            provider: assignment.provider_name,
        };
        if let Err(e) = self.guard.check(&self.ledger, &ctx) {
            warn!(level = e.level, "SCAN blocked by budget guard");
            return (PhaseResult::blocked(e.reason), None);
        }

        let prompt = format!(
            "Scan for findings relevant to objectives: {}",
            objectives.iter().map(|o| o.title.clone()).collect::<Vec<_>>().join(", ")
        );
        let response = assignment
            .adapter
            .generate(GenerateRequest {
                system_prompt: None,
                user_prompt: prompt,
                json_mode: true,
            })
            .await;

        let (findings, cost_usd, tokens, latency_ms) = match response {
            Ok(r) => {
                let findings = parse_findings(&r.text);
                (findings, r.cost_usd, (r.input_tokens, r.output_tokens), r.latency_ms)
            }
            Err(e) => {
                warn!(error = %e, "SCAN adapter call failed");
                return (PhaseResult::blocked(e.to_string()), None);
            }
        };

        self.record_cost("scan", None, assignment.provider_name, "scan-model", cost_usd, tokens, latency_ms);

        let scan = Scan {
            id: crate::domain::new_id(),
            cycle_id: cycle.id.clone(),
            objective_ids: objectives.iter().map(|o| o.id.clone()).collect(),
            findings,
            cost_usd,
            tokens: tokens.0 + tokens.1,
            latency_ms,
            created_at: crate::domain::now(),
        };
        self.store.append_scan(scan.clone()).await;

        info!(cycle_id = %cycle.id, findings = scan.findings.len(), "SCAN complete");
        (
            PhaseResult {
                success: true,
                cost_usd,
                error: None,
                tasks_created: 0,
                tasks_completed: 0,
            },
            Some(scan),
        )
    }

    pub async fn run_plan(&self, cycle: &Cycle, ctx: &CycleContext) -> (PhaseResult, Option<Plan>) {
        let Some(last_scan) = ctx.last_scan.as_ref() else {
            return (PhaseResult::blocked("no scan to plan from".to_string()), None);
        };

        let objectives = self.active_objectives().await;
        let assignment = self.router.get_adapter(Role::Planning);
        let call_ctx = CallContext {
            estimated_cost_usd: PLAN_ESTIMATED_COST_USD,
            task_id: None,
            cycle_spend_usd: cycle.total_cost_usd,
            provider: assignment.provider_name,
        };
        if let Err(e) = self.guard.check(&self.ledger, &call_ctx) {
            warn!(level = e.level, "PLAN blocked by budget guard");
            return (PhaseResult::blocked(e.reason), None);
        }

        let prompt = format!(
            "Given {} findings and objectives {:?}, produce a plan.",
            last_scan.findings.len(),
            objectives.iter().map(|o| o.title.clone()).collect::<Vec<_>>()
        );
        let response = assignment
            .adapter
            .generate(GenerateRequest {
                system_prompt: None,
                user_prompt: prompt,
                json_mode: true,
            })
            .await;

        let fallback_objective = objectives.first().map(|o| o.id.clone());
        let (strategy, cost_usd, tokens, latency_ms) = match response {
            Ok(r) => {
                let strategy = parse_strategy(&r.text, fallback_objective.as_deref());
                (strategy, r.cost_usd, (r.input_tokens, r.output_tokens), r.latency_ms)
            }
            Err(e) => {
                warn!(error = %e, "PLAN adapter call failed");
                return (PhaseResult::blocked(e.to_string()), None);
            }
        };

        self.record_cost("plan", None, assignment.provider_name, "plan-model", cost_usd, tokens, latency_ms);

        let total_proposed: usize = strategy.priorities.iter().map(|p| p.proposed_tasks.len()).sum();
        if total_proposed > MAX_PROPOSED_TASKS_TOTAL {
            warn!(total_proposed, "PLAN proposed more tasks than the advisory bound");
        }

        let plan = Plan {
            id: crate::domain::new_id(),
            cycle_id: cycle.id.clone(),
            scan_id: last_scan.id.clone(),
            strategy,
            created_at: crate::domain::now(),
        };
        self.store.append_plan(plan.clone()).await;

        info!(cycle_id = %cycle.id, priorities = plan.strategy.priorities.len(), "PLAN complete");
        (
            PhaseResult {
                success: true,
                cost_usd,
                error: None,
                tasks_created: 0,
                tasks_completed: 0,
            },
            Some(plan),
        )
    }

    pub async fn run_build(&self, cycle: &Cycle, ctx: &CycleContext) -> (PhaseResult, Vec<Task>) {
        let Some(last_plan) = ctx.last_plan.as_ref() else {
            return (PhaseResult::blocked("no plan to build from".to_string()), Vec::new());
        };

        let worker_assignment = self.router.get_build_worker();
        let mut created = Vec::new();
        let mut total_cost = 0.0;

        for priority in &last_plan.strategy.priorities {
            for proposed in &priority.proposed_tasks {
                let call_ctx = CallContext {
                    estimated_cost_usd: BUILD_ESTIMATED_COST_USD,
                    task_id: None,
                    cycle_spend_usd: cycle.total_cost_usd + total_cost,
                    provider: worker_assignment.provider_name,
                };
                if let Err(e) = self.guard.check(&self.ledger, &call_ctx) {
                    warn!(level = e.level, "BUILD blocked by budget guard for a proposed task");
                    return (
                        PhaseResult {
                            success: false,
                            cost_usd: total_cost,
                            error: Some(e.reason),
                            tasks_created: created.len() as u64,
                            tasks_completed: 0,
                        },
                        created,
                    );
                }

                let tier = tier::resolve(
                    &proposed.title,
                    &proposed.description,
                    AutonomyTier::from_u8(proposed.suggested_tier),
                );

                let mut task = Task::new(
                    priority.objective_id.clone(),
                    cycle.id.clone(),
                    proposed.title.clone(),
                    proposed.description.clone(),
                    tier,
                    BUILD_ESTIMATED_COST_USD,
                    TaskState::Building,
                );

                if tier == AutonomyTier::T2 {
                    task.transition(TaskState::AwaitingApproval);
                    self.store.save_task(&task).await;
                    created.push(task);
                    continue;
                }

                let instruction = format!("{}\n\n{}", proposed.title, proposed.description);
                match worker_assignment
                    .adapter
                    .execute(&instruction, ".", &priority.rationale)
                    .await
                {
                    Ok(build_result) => {
                        total_cost += build_result.cost_usd;
                        self.record_cost(
                            "build",
                            Some(&task.id),
                            worker_assignment.provider_name,
                            "build-worker",
                            build_result.cost_usd,
                            (0, 0),
                            build_result.latency_ms,
                        );
                        task.add_cost(build_result.cost_usd);
                        if build_result.success {
                            task.transition(TaskState::Reviewing);
                            task.artifacts = build_result
                                .artifacts
                                .into_iter()
                                .filter(|a| {
                                    matches!(
                                        a.artifact_type,
                                        ArtifactType::Branch
                                            | ArtifactType::Pr
                                            | ArtifactType::File
                                            | ArtifactType::Url
                                            | ArtifactType::Log
                                    )
                                })
                                .collect::<Vec<Artifact>>();
                        } else {
                            task.transition(TaskState::Failed);
                            task.error = build_result.error;
                        }
                    }
                    Err(e) => {
                        task.transition(TaskState::Failed);
                        task.error = Some(e.to_string());
                    }
                }

                self.store.save_task(&task).await;
                created.push(task);
            }
        }

        let tasks_created = created.len() as u64;
        (
            PhaseResult {
                success: true,
                cost_usd: total_cost,
                error: None,
                tasks_created,
                tasks_completed: 0,
            },
            created,
        )
    }

    pub async fn run_ship_check(&self, cycle: &Cycle, tasks: &mut [Task]) -> PhaseResult {
        let worker_assignment = self.router.get_build_worker();
        let mut total_cost = 0.0;
        let mut completed = 0u64;

        for task in tasks.iter_mut() {
            if task.state != TaskState::Reviewing {
                continue;
            }

            let call_ctx = CallContext {
                estimated_cost_usd: SHIP_CHECK_ESTIMATED_COST_USD,
                task_id: Some(&task.id),
                cycle_spend_usd: cycle.total_cost_usd + total_cost,
                provider: worker_assignment.provider_name,
            };
            if let Err(e) = self.guard.check(&self.ledger, &call_ctx) {
                warn!(level = e.level, "SHIP_CHECK blocked by budget guard");
                return PhaseResult {
                    success: false,
                    cost_usd: total_cost,
                    error: Some(e.reason),
                    tasks_created: 0,
                    tasks_completed: completed,
                };
            }

            let synthesized = format!("Artifacts: {}", task.artifacts.len());
            let fake_build_result = crate::adapter::BuildResult {
                output: synthesized.clone(),
                success: true,
                error: None,
                artifacts: task.artifacts.clone(),
                latency_ms: 0,
                cost_usd: 0.0,
            };

            match worker_assignment.adapter.check(task, &fake_build_result).await {
                Ok(check) => {
                    total_cost += check.cost_usd;
                    self.record_cost(
                        "ship_check",
                        Some(&task.id),
                        worker_assignment.provider_name,
                        "build-worker",
                        check.cost_usd,
                        (0, 0),
                        check.latency_ms,
                    );
                    let run = Run {
                        id: crate::domain::new_id(),
                        cycle_id: cycle.id.clone(),
                        task_id: Some(task.id.clone()),
                        phase: "ship_check".to_string(),
                        provider: worker_assignment.provider_name.to_string(),
                        model: "build-worker".to_string(),
                        prompt: synthesized,
                        response: Some(check.summary.clone()),
                        success: check.approved,
                        error: if check.approved {
                            None
                        } else {
                            Some(check.issues.join("; "))
                        },
                        tokens: 0,
                        cost_usd: check.cost_usd,
                        latency_ms: check.latency_ms,
                        created_at: crate::domain::now(),
                    };
                    self.store.append_run(run).await;

                    if check.approved {
                        task.transition(TaskState::Completed);
                        task.truth_label = Some(TruthLabel::implemented_medium());
                        completed += 1;
                    } else {
                        task.transition(TaskState::Failed);
                        task.error = Some(check.issues.join("; "));
                    }
                }
                Err(e) => {
                    task.transition(TaskState::Failed);
                    task.error = Some(e.to_string());
                }
            }

            self.store.save_task(task).await;
        }

        PhaseResult {
            success: true,
            cost_usd: total_cost,
            error: None,
            tasks_created: 0,
            tasks_completed: completed,
        }
    }

    pub async fn run_eval(&self, cycle: &Cycle, tasks: &[Task]) -> (PhaseResult, Option<Evaluation>) {
        let assignment = self.router.get_adapter(Role::Planning);
        let call_ctx = CallContext {
            estimated_cost_usd: EVAL_ESTIMATED_COST_USD,
            task_id: None,
            cycle_spend_usd: cycle.total_cost_usd,
            provider: assignment.provider_name,
        };
        if let Err(e) = self.guard.check(&self.ledger, &call_ctx) {
            warn!(level = e.level, "EVAL blocked by budget guard");
            return (PhaseResult::blocked(e.reason), None);
        }

        let real_completed = tasks.iter().filter(|t| t.state == TaskState::Completed).count() as u64;
        let real_failed = tasks.iter().filter(|t| t.state == TaskState::Failed).count() as u64;

        let prompt = format!(
            "Evaluate cycle {} with {} tasks completed, {} failed.",
            cycle.number, real_completed, real_failed
        );
        let response = assignment
            .adapter
            .generate(GenerateRequest {
                system_prompt: None,
                user_prompt: prompt,
                json_mode: true,
            })
            .await;

        let (mut metrics, insights, recommendations, cost_usd, tokens, latency_ms) = match response {
            Ok(r) => {
                let (metrics, insights, recommendations) = parse_eval(&r.text);
                (metrics, insights, recommendations, r.cost_usd, (r.input_tokens, r.output_tokens), r.latency_ms)
            }
            Err(e) => {
                warn!(error = %e, "EVAL adapter call failed");
                return (PhaseResult::blocked(e.to_string()), None);
            }
        };

        // Core overrides model-reported values with authoritative counts (§4.6).
        metrics.tasks_completed = real_completed;
        metrics.tasks_failed = real_failed;
        metrics.total_cost_usd = cycle.total_cost_usd;

        self.record_cost("eval", None, assignment.provider_name, "eval-model", cost_usd, tokens, latency_ms);

        let now = crate::domain::now();
        let evaluation = Evaluation {
            id: crate::domain::new_id(),
            cycle_id: cycle.id.clone(),
            period: Period {
                start: cycle.started_at,
                end: now,
            },
            metrics,
            insights,
            recommendations,
            created_at: now,
        };
        self.store.append_evaluation(evaluation.clone()).await;

        info!(cycle_id = %cycle.id, "EVAL complete");
        (
            PhaseResult {
                success: true,
                cost_usd,
                error: None,
                tasks_created: 0,
                tasks_completed: 0,
            },
            Some(evaluation),
        )
    }
}

fn parse_error_finding() -> Finding {
    Finding {
        summary: "Parse-Error".to_string(),
        relevance: 0.0,
        sources: Vec::new(),
        truth_label: TruthLabel::speculative_low(),
    }
}

fn parse_findings(raw: &str) -> Vec<Finding> {
    let Some(value) = crate::adapter::extract_json(raw) else {
        return vec![parse_error_finding()];
    };
    let Some(findings) = value.get("findings").and_then(Value::as_array) else {
        return vec![parse_error_finding()];
    };
    if findings.is_empty() {
        return Vec::new();
    }

    findings
        .iter()
        .map(|f| {
            let summary = f
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let relevance = f.get("relevance").and_then(Value::as_f64).unwrap_or(0.0).clamp(0.0, 1.0);
            let sources = f
                .get("sources")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|s| s.as_str().map(String::from)).collect())
                .unwrap_or_default();
            let truth_status = f
                .get("truthStatus")
                .and_then(Value::as_str)
                .and_then(TruthStatus::from_str)
                .filter(|s| matches!(s, TruthStatus::Speculative | TruthStatus::Hypothesis))
                .unwrap_or(TruthStatus::Speculative);
            let confidence = f
                .get("confidence")
                .and_then(Value::as_str)
                .and_then(Confidence::from_str)
                .unwrap_or(Confidence::Low);
            Finding {
                summary,
                relevance,
                sources,
                truth_label: TruthLabel::new(truth_status, confidence),
            }
        })
        .collect()
}

fn parse_strategy(raw: &str, fallback_objective: Option<&str>) -> Strategy {
    let Some(value) = crate::adapter::extract_json(raw) else {
        return Strategy {
            summary: "parse error".to_string(),
            priorities: Vec::new(),
        };
    };
    let strategy_value = value.get("strategy").unwrap_or(&value);
    let summary = strategy_value
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let priorities = strategy_value
        .get("priorities")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|p| {
                    let objective_id = p
                        .get("objectiveId")
                        .and_then(Value::as_str)
                        .map(String::from)
                        .or_else(|| fallback_objective.map(String::from))
                        .unwrap_or_default();
                    let rationale = p
                        .get("rationale")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string();
                    let mut proposed_tasks: Vec<ProposedTask> = p
                        .get("proposedTasks")
                        .and_then(Value::as_array)
                        .map(|tasks| tasks.iter().map(parse_proposed_task).collect())
                        .unwrap_or_default();
                    proposed_tasks.truncate(MAX_PROPOSED_TASKS_PER_PRIORITY);
                    Priority {
                        objective_id,
                        rationale,
                        proposed_tasks,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Strategy { summary, priorities }
}

fn parse_proposed_task(value: &Value) -> ProposedTask {
    let title = value.get("title").and_then(Value::as_str).unwrap_or("").to_string();
    let description = value
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let estimated_complexity = value
        .get("estimatedComplexity")
        .and_then(Value::as_str)
        .and_then(|s| match s {
            "trivial" => Some(Complexity::Trivial),
            "small" => Some(Complexity::Small),
            "medium" => Some(Complexity::Medium),
            "large" => Some(Complexity::Large),
            _ => None,
        })
        .unwrap_or(Complexity::Medium);
    let suggested_tier = value
        .get("suggestedTier")
        .and_then(Value::as_u64)
        .map(|v| v as u8)
        .unwrap_or(0);
    ProposedTask {
        title,
        description,
        estimated_complexity,
        suggested_tier,
    }
}

fn parse_eval(raw: &str) -> (EvalMetrics, Vec<String>, Vec<Recommendation>) {
    let Some(value) = crate::adapter::extract_json(raw) else {
        return (EvalMetrics::default(), Vec::new(), Vec::new());
    };

    let metrics = value
        .get("metrics")
        .map(|m| EvalMetrics {
            tasks_completed: m.get("tasksCompleted").and_then(Value::as_u64).unwrap_or(0),
            tasks_failed: m.get("tasksFailed").and_then(Value::as_u64).unwrap_or(0),
            total_cost_usd: m.get("totalCostUsd").and_then(Value::as_f64).unwrap_or(0.0),
            avg_task_latency_ms: m.get("avgTaskLatencyMs").and_then(Value::as_f64).unwrap_or(0.0),
            objective_progress: m
                .get("objectiveProgress")
                .and_then(Value::as_object)
                .map(|obj| {
                    obj.iter()
                        .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f.clamp(0.0, 1.0))))
                        .collect()
                })
                .unwrap_or_default(),
        })
        .unwrap_or_default();

    let insights = value
        .get("insights")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    let recommendations = value
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|r| {
                    let text = r.get("text").and_then(Value::as_str).unwrap_or("").to_string();
                    let priority = r
                        .get("priority")
                        .and_then(Value::as_str)
                        .and_then(|s| match s {
                            "low" => Some(RecommendationPriority::Low),
                            "medium" => Some(RecommendationPriority::Medium),
                            "high" => Some(RecommendationPriority::High),
                            _ => None,
                        })
                        .unwrap_or(RecommendationPriority::Medium);
                    Recommendation {
                        text,
                        priority,
                        truth_label: TruthLabel::hypothesis_medium(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    (metrics, insights, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{GenerateRequest, GenerateResponse, MockAdapter, MockBuildWorker, TextGenAdapter};
    use crate::config::RouterMode;
    use crate::domain::{BudgetConfig, Objective};
    use crate::errors::AdapterError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FailingAdapter;

    #[async_trait]
    impl TextGenAdapter for FailingAdapter {
        fn provider(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock"
        }

        async fn generate(&self, _req: GenerateRequest) -> Result<GenerateResponse, AdapterError> {
            Err(AdapterError::Timeout(1_000))
        }
    }

    fn executor_with(router: Router) -> (PhaseExecutor, Arc<CostLedger>, Arc<dyn Store>) {
        let ledger = Arc::new(CostLedger::new());
        let guard = Arc::new(BudgetGuard::new(BudgetConfig::default()));
        let store: Arc<dyn Store> = Arc::new(crate::store::MemoryStore::default());
        (
            PhaseExecutor::new(Arc::new(router), ledger.clone(), guard, store.clone()),
            ledger,
            store,
        )
    }

    fn simulation_router() -> Router {
        Router::new(
            RouterMode::Simulation,
            HashMap::new(),
            Arc::new(MockAdapter::default()),
            Arc::new(MockBuildWorker),
        )
    }

    #[tokio::test]
    async fn scan_fails_without_active_objectives() {
        let (executor, _, _) = executor_with(simulation_router());
        let cycle = Cycle::new(1, "simulation");
        let (result, scan) = executor.run_scan(&cycle).await;
        assert!(!result.success);
        assert!(scan.is_none());
    }

    #[tokio::test]
    async fn scan_succeeds_and_parses_empty_mock_response() {
        let (executor, _, store) = executor_with(simulation_router());
        store.save_objective(&Objective::new("Test", "")).await;
        let cycle = Cycle::new(1, "simulation");
        let (result, scan) = executor.run_scan(&cycle).await;
        assert!(result.success);
        assert!(scan.is_some());
    }

    #[tokio::test]
    async fn scan_fails_whole_phase_on_adapter_transport_error() {
        let router = Router::new(
            RouterMode::Simulation,
            HashMap::new(),
            Arc::new(FailingAdapter),
            Arc::new(MockBuildWorker),
        );
        let (executor, _, store) = executor_with(router);
        store.save_objective(&Objective::new("Test", "")).await;
        let cycle = Cycle::new(1, "simulation");
        let (result, scan) = executor.run_scan(&cycle).await;
        assert!(!result.success);
        assert!(scan.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn plan_fails_without_prior_scan() {
        let (executor, _, _) = executor_with(simulation_router());
        let cycle = Cycle::new(1, "simulation");
        let ctx = CycleContext::default();
        let (result, plan) = executor.run_plan(&cycle, &ctx).await;
        assert!(!result.success);
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn build_creates_awaiting_approval_task_for_t2() {
        let (executor, _, _) = executor_with(simulation_router());
        let cycle = Cycle::new(1, "simulation");
        let plan = Plan {
            id: "p1".into(),
            cycle_id: cycle.id.clone(),
            scan_id: "s1".into(),
            strategy: Strategy {
                summary: "s".into(),
                priorities: vec![Priority {
                    objective_id: "o1".into(),
                    rationale: "r".into(),
                    proposed_tasks: vec![ProposedTask {
                        title: "Deploy to production".into(),
                        description: "".into(),
                        estimated_complexity: Complexity::Medium,
                        suggested_tier: 0,
                    }],
                }],
            },
            created_at: crate::domain::now(),
        };
        let ctx = CycleContext {
            last_scan: None,
            last_plan: Some(plan),
            last_tasks: Vec::new(),
        };
        let (result, tasks) = executor.run_build(&cycle, &ctx).await;
        assert!(result.success);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].state, TaskState::AwaitingApproval);
    }

    #[test]
    fn parse_findings_falls_back_to_sentinel_on_garbage() {
        let findings = parse_findings("not json");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].summary, "Parse-Error");
    }

    #[test]
    fn parse_strategy_falls_back_objective_id() {
        let raw = r#"{"strategy":{"summary":"go","priorities":[{"rationale":"r","proposedTasks":[]}]}}"#;
        let strategy = parse_strategy(raw, Some("fallback-obj"));
        assert_eq!(strategy.priorities[0].objective_id, "fallback-obj");
    }
}
