//! Orchestrator (§4.8): owns the engine state, runs cycles, drives the
//! state machine, invokes the phase executor in order, finalizes cycles,
//! and schedules the next one.
//!
//! Grounded on the deleted teacher `orchestrator/mod.rs`'s persistence-
//! ownership doc comment (the Orchestrator is the sole writer of
//! EngineState) and `orchestrator::runner`/`factory::pipeline`'s cycle-loop
//! shape.

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::budget::BudgetGuard;
use crate::config::{EngineConfig, SharedConfig};
use crate::domain::{Confidence, Cycle, DecisionLogEntry, EngineState, ExperimentLogEntry, Run, Task};
use crate::errors::PreconditionError;
use crate::events::{EngineEvent, EventBus};
use crate::ledger::CostLedger;
use crate::phase_executor::{CycleContext, PhaseExecutor};
use crate::router::Router;
use crate::state_machine::{can_transition, LoopState, Phase};
use crate::store::Store;

pub type PresetHandler = Box<dyn Fn() + Send + Sync>;

pub struct Orchestrator {
    store: Arc<dyn Store>,
    executor: PhaseExecutor,
    ledger: Arc<CostLedger>,
    router: Arc<Router>,
    guard: Arc<BudgetGuard>,
    config: SharedConfig,
    config_path: PathBuf,
    events: EventBus,
    scheduler: crate::scheduler::SharedScheduler,
    state: RwLock<EngineState>,
    running: RwLock<bool>,
    presets: RwLock<HashMap<String, PresetHandler>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        executor: PhaseExecutor,
        ledger: Arc<CostLedger>,
        router: Arc<Router>,
        guard: Arc<BudgetGuard>,
        config: SharedConfig,
        config_path: PathBuf,
    ) -> Self {
        Self {
            store,
            executor,
            ledger,
            router,
            guard,
            config,
            config_path,
            events: EventBus::default(),
            scheduler: Arc::new(crate::scheduler::Scheduler::default()),
            state: RwLock::new(EngineState::default()),
            running: RwLock::new(false),
            presets: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub async fn register_preset(&self, name: impl Into<String>, handler: PresetHandler) {
        self.presets.write().await.insert(name.into(), handler);
    }

    /// §4.8.1 `start()`.
    pub async fn start(self: &Arc<Self>) {
        let mut persisted = self.store.load_engine_state().await;
        if persisted.loop_state.is_transient() {
            persisted.loop_state = LoopState::Idle;
        }
        *self.state.write().await = persisted;
        *self.running.write().await = true;

        let cooldown = self.config.read().await.cycle_cooldown_minutes;
        self.schedule_next_cycle(cooldown).await;
    }

    /// §4.8.1 `stop()`.
    pub async fn stop(&self) {
        *self.running.write().await = false;
        self.scheduler.cancel().await;
        let state = self.state.read().await.clone();
        self.store.save_engine_state(&state).await;
    }

    pub async fn get_state(&self) -> EngineState {
        self.state.read().await.clone()
    }

    /// §4.8.2 `pause()`: idempotent from any non-paused state.
    pub async fn pause(&self) {
        self.scheduler.cancel().await;
        let mut state = self.state.write().await;
        if state.loop_state != LoopState::Paused {
            state.loop_state = LoopState::Paused;
        }
    }

    /// §4.8.2 `resume()`: no-op unless currently paused.
    pub async fn resume(self: &Arc<Self>) {
        let cooldown = {
            let mut state = self.state.write().await;
            if state.loop_state != LoopState::Paused {
                return;
            }
            state.loop_state = LoopState::Idle;
            self.config.read().await.cycle_cooldown_minutes
        };
        self.schedule_next_cycle(cooldown).await;
    }

    /// §4.8.2 `trigger(preset?)`.
    pub async fn trigger(self: &Arc<Self>, preset: Option<&str>) -> Result<String, PreconditionError> {
        {
            let state = self.state.read().await;
            if state.loop_state != LoopState::Idle && state.loop_state != LoopState::Paused {
                return Err(PreconditionError::EngineBusy(state.loop_state.as_str().to_string()));
            }
        }
        self.scheduler.cancel().await;

        if let Some(name) = preset {
            let presets = self.presets.read().await;
            match presets.get(name) {
                Some(handler) => handler(),
                None => warn!(preset = name, "unknown preset on trigger"),
            }
        }

        Ok(self.run_cycle().await)
    }

    /// §4.8.2 `reloadConfig()`: re-reads `EngineConfig` from disk and pushes
    /// the new router mode/enabled-providers and budget caps live, without a
    /// restart.
    pub async fn reload_config(&self) {
        match EngineConfig::load(&self.config_path) {
            Ok(new_config) => {
                self.router.update_config(new_config.router.mode, new_config.router.enabled_providers.clone());
                self.guard.update_budgets(new_config.budgets.clone());
                *self.config.write().await = new_config;
                info!("config reloaded");
            }
            Err(e) => {
                warn!(error = %e, "config reload failed, keeping previous config");
            }
        }
    }

    /// `config.get` control-surface op (§6.3): a snapshot of the live config.
    pub async fn config_get(&self) -> EngineConfig {
        self.config.read().await.clone()
    }

    /// `config.set` control-surface op (§6.3), mode variant. Parses and
    /// validates `mode` before touching anything (§7 ConfigurationError:
    /// "rejected at the boundary; no state change"); only a valid mode is
    /// pushed into the router and persisted.
    pub async fn set_mode(&self, mode: &str) -> Result<(), crate::errors::ConfigError> {
        let parsed = crate::config::RouterMode::parse(mode)?;
        let mut config = self.config.write().await;
        config.router.mode = parsed;
        self.router.update_config(config.router.mode, config.router.enabled_providers.clone());
        config.save(&self.config_path)?;
        info!(mode = parsed.as_str(), "config.set applied new router mode");
        Ok(())
    }

    /// `budget.status` control-surface op (§6.3): ledger totals plus the
    /// live caps the Budget Guard is currently enforcing.
    pub fn budget_status(&self) -> BudgetStatus {
        BudgetStatus {
            cost: self.cost_summary(),
            caps: self.guard.budgets(),
        }
    }

    async fn schedule_next_cycle(self: &Arc<Self>, cooldown_minutes: u64) {
        let running = *self.running.read().await;
        if !running {
            return;
        }
        let scheduler = self.scheduler.clone();
        let delay = Duration::from_secs(cooldown_minutes.max(1) * 60);
        let self_arc = self.clone();
        let scheduled_at = scheduler
            .schedule_async(delay, move || async move {
                self_arc.run_cycle().await;
            })
            .await;
        self.state.write().await.next_cycle_scheduled_at = Some(scheduled_at);
    }

    /// §4.8.3 cycle execution.
    pub fn run_cycle(self: &Arc<Self>) -> Pin<Box<dyn std::future::Future<Output = String> + Send>> {
        let this = Arc::clone(self);
        Box::pin(async move {
            let existing_cycles = this.store.list_cycles().await.len() as u64;
            let mode = this.config.read().await.router.mode.as_str().to_string();
            let mut cycle = Cycle::new(existing_cycles + 1, mode);
            this.store.save_cycle(&cycle).await;

            {
                let mut state = this.state.write().await;
                state.current_cycle_id = Some(cycle.id.clone());
            }

            let mut ctx = CycleContext::default();
            let mut failed = false;

            for phase in Phase::ORDER {
                if !*this.running.read().await {
                    break;
                }

                let target = phase.loop_state();
                if !this.transition_to(target).await {
                    warn!(phase = phase.as_str(), "phase unreachable from current state, skipping");
                    continue;
                }

                cycle.start_phase(phase.as_str());
                {
                    let mut state = this.state.write().await;
                    state.current_phase = Some(phase.as_str().to_string());
                }

                let (success, cost_usd, error, tasks_created, tasks_completed) = this.run_phase(phase, &cycle, &mut ctx).await;
                cycle.complete_phase(phase.as_str(), cost_usd);
                cycle.tasks_created += tasks_created;
                cycle.tasks_completed += tasks_completed;
                this.store.save_cycle(&cycle).await;

                this.events.publish(EngineEvent::PhaseComplete {
                    phase: phase.as_str().to_string(),
                    cycle_id: cycle.id.clone(),
                    cycle_number: cycle.number,
                    success,
                    cost_usd,
                    error: error.clone(),
                });

                if !success {
                    this.transition_to(LoopState::Error).await;
                    this.state.write().await.error = error;
                    failed = true;
                    break;
                }
            }

            cycle.finalize(!failed);
            this.store.save_cycle(&cycle).await;

            {
                let mut state = this.state.write().await;
                if !failed {
                    state.total_cycles_completed += 1;
                    state.last_cycle_completed_at = cycle.completed_at;
                    state.error = None;
                }
                state.current_cycle_id = None;
                state.current_phase = None;
                state.current_task_id = None;
            }
            this.transition_to(LoopState::Idle).await;
            this.store.save_engine_state(&this.get_state().await).await;

            let cooldown = this.config.read().await.cycle_cooldown_minutes;
            this.schedule_next_cycle(cooldown).await;

            cycle.id
        })
    }

    async fn run_phase(&self, phase: Phase, cycle: &Cycle, ctx: &mut CycleContext) -> (bool, f64, Option<String>, u64, u64) {
        let result = match phase {
            Phase::Scan => {
                let (result, scan) = self.executor.run_scan(cycle).await;
                ctx.last_scan = scan;
                result
            }
            Phase::Plan => {
                let (result, plan) = self.executor.run_plan(cycle, ctx).await;
                ctx.last_plan = plan;
                result
            }
            Phase::Build => {
                let (result, tasks) = self.executor.run_build(cycle, ctx).await;
                ctx.last_tasks = tasks;
                result
            }
            Phase::ShipCheck => self.executor.run_ship_check(cycle, &mut ctx.last_tasks).await,
            Phase::Eval => {
                let (result, eval) = self.executor.run_eval(cycle, &ctx.last_tasks).await;
                if let Some(eval) = &eval {
                    for (objective_id, progress) in &eval.metrics.objective_progress {
                        self.store
                            .append_experiment(ExperimentLogEntry {
                                id: crate::domain::new_id(),
                                cycle_id: cycle.id.clone(),
                                objective_id: objective_id.clone(),
                                hypothesis: format!("objective {objective_id} advances this cycle"),
                                outcome: format!("progress delta {progress:.2}"),
                                confidence: Confidence::Medium,
                                timestamp: crate::domain::now(),
                            })
                            .await;
                    }
                }
                ctx.last_scan = None;
                ctx.last_plan = None;
                ctx.last_tasks = Vec::new();
                result
            }
        };

        let rationale = result.error.clone().unwrap_or_else(|| {
            format!(
                "cost {:.4} usd, {} tasks created, {} tasks completed",
                result.cost_usd, result.tasks_created, result.tasks_completed
            )
        });
        self.store
            .append_decision(DecisionLogEntry {
                id: crate::domain::new_id(),
                cycle_id: cycle.id.clone(),
                phase: phase.as_str().to_string(),
                summary: format!("{} {}", phase.as_str(), if result.success { "succeeded" } else { "failed" }),
                rationale,
                related_task_id: None,
                timestamp: crate::domain::now(),
            })
            .await;

        (result.success, result.cost_usd, result.error, result.tasks_created, result.tasks_completed)
    }

    /// "Try via idle" recovery (§9, §4.8.3.b): if `target` isn't directly
    /// reachable but `idle` is, go via idle first; otherwise skip.
    async fn transition_to(&self, target: LoopState) -> bool {
        let mut state = self.state.write().await;
        let from = state.loop_state;
        if from == target || can_transition(from, target) {
            self.events.publish(EngineEvent::StateChanged {
                from,
                to: target,
                phase: crate::state_machine::phase_for_state(target).map(|p| p.as_str().to_string()),
                cycle_id: state.current_cycle_id.clone(),
            });
            state.loop_state = target;
            return true;
        }
        if can_transition(from, LoopState::Idle) && can_transition(LoopState::Idle, target) {
            self.events.publish(EngineEvent::StateChanged {
                from,
                to: LoopState::Idle,
                phase: None,
                cycle_id: state.current_cycle_id.clone(),
            });
            self.events.publish(EngineEvent::StateChanged {
                from: LoopState::Idle,
                to: target,
                phase: crate::state_machine::phase_for_state(target).map(|p| p.as_str().to_string()),
                cycle_id: state.current_cycle_id.clone(),
            });
            state.loop_state = target;
            return true;
        }
        false
    }

    pub async fn active_tasks(&self) -> Vec<Task> {
        self.store.list_tasks().await
    }

    /// `objectives.update` control-surface op (§6.3): loads the objective,
    /// applies the edit set through `Objective::apply_update` so the
    /// "weight clamped on write" invariant (§3) is reachable from the
    /// control surface, then persists it.
    pub async fn update_objective(
        &self,
        id: &str,
        edit: crate::domain::ObjectiveUpdate,
    ) -> Result<crate::domain::Objective, PreconditionError> {
        let mut objective = self
            .store
            .list_objectives()
            .await
            .into_iter()
            .find(|o| o.id == id)
            .ok_or_else(|| PreconditionError::Other(format!("objective {id} not found")))?;
        objective.apply_update(edit);
        self.store.save_objective(&objective).await;
        Ok(objective)
    }

    /// `tasks.detail` control-surface op (§6.3): a task joined with the
    /// Runs recorded against it.
    pub async fn task_detail(&self, id: &str) -> Option<TaskDetail> {
        let task = self.store.get_task(id).await?;
        let runs = self
            .store
            .list_runs()
            .await
            .into_iter()
            .filter(|r| r.task_id.as_deref() == Some(id))
            .collect();
        Some(TaskDetail { task, runs })
    }

    /// `cost.summary` control-surface op (§6.3): `{total, byProvider,
    /// byPhase, runCount}` built from the ledger's own records.
    pub fn cost_summary(&self) -> CostSummary {
        let records = self.ledger.get_records();
        let mut by_provider: HashMap<String, f64> = HashMap::new();
        let mut by_phase: HashMap<String, f64> = HashMap::new();
        for rec in &records {
            *by_provider.entry(rec.provider.clone()).or_insert(0.0) += rec.cost_usd;
            *by_phase.entry(rec.phase.clone()).or_insert(0.0) += rec.cost_usd;
        }
        CostSummary {
            total_usd: self.ledger.total(),
            by_provider,
            by_phase,
            run_count: records.len(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TaskDetail {
    pub task: Task,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CostSummary {
    pub total_usd: f64,
    pub by_provider: HashMap<String, f64>,
    pub by_phase: HashMap<String, f64>,
    pub run_count: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BudgetStatus {
    pub cost: CostSummary,
    pub caps: crate::domain::BudgetConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{MockAdapter, MockBuildWorker};
    use crate::budget::BudgetGuard;
    use crate::config::{EngineConfig, RouterMode};
    use crate::domain::{BudgetConfig, Objective};
    use crate::router::Router;
    use crate::store::MemoryStore;
    use std::collections::HashMap;

    fn build_orchestrator() -> Arc<Orchestrator> {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::default());
        let ledger = Arc::new(CostLedger::new());
        let guard = Arc::new(BudgetGuard::new(BudgetConfig::default()));
        let router = Arc::new(Router::new(
            RouterMode::Simulation,
            HashMap::new(),
            Arc::new(MockAdapter::default()),
            Arc::new(MockBuildWorker),
        ));
        let executor = PhaseExecutor::new(router.clone(), ledger.clone(), guard.clone(), store.clone());
        let config = EngineConfig {
            cycle_cooldown_minutes: 1,
            ..Default::default()
        };
        Arc::new(Orchestrator::new(
            store,
            executor,
            ledger,
            router,
            guard,
            crate::config::shared(config),
            PathBuf::from("cycleforge.toml"),
        ))
    }

    /// Scenario A from §8.2.
    #[tokio::test]
    async fn simulation_cycle_completes_and_returns_idle() {
        let orchestrator = build_orchestrator();
        orchestrator.store.save_objective(&Objective::new("Test", "")).await;
        *orchestrator.running.write().await = true;

        let cycle_id = orchestrator.run_cycle().await;
        assert!(!cycle_id.is_empty());

        let state = orchestrator.get_state().await;
        assert_eq!(state.loop_state, LoopState::Idle);
        assert_eq!(state.total_cycles_completed, 1);
    }

    #[tokio::test]
    async fn completed_cycle_schedules_the_next_one() {
        let orchestrator = build_orchestrator();
        orchestrator.store.save_objective(&Objective::new("Test", "")).await;
        *orchestrator.running.write().await = true;

        orchestrator.run_cycle().await;

        let state = orchestrator.get_state().await;
        assert!(state.next_cycle_scheduled_at.is_some());
    }

    #[tokio::test]
    async fn run_cycle_appends_a_decision_log_entry_per_phase() {
        let orchestrator = build_orchestrator();
        orchestrator.store.save_objective(&Objective::new("Test", "")).await;
        *orchestrator.running.write().await = true;

        orchestrator.run_cycle().await;

        let decisions = orchestrator.store.list_decisions().await;
        assert_eq!(decisions.len(), Phase::ORDER.len());
        assert!(decisions.iter().any(|d| d.phase == Phase::Scan.as_str()));
    }

    #[tokio::test]
    async fn budget_status_reports_live_caps() {
        let orchestrator = build_orchestrator();
        let status = orchestrator.budget_status();
        assert_eq!(status.caps.per_call_usd, BudgetConfig::default().per_call_usd);

        orchestrator.guard.update_budgets(BudgetConfig {
            per_call_usd: 1.23,
            ..Default::default()
        });
        let status = orchestrator.budget_status();
        assert_eq!(status.caps.per_call_usd, 1.23);
    }

    #[tokio::test]
    async fn reload_config_pushes_new_budgets_into_the_live_guard() {
        let orchestrator = build_orchestrator();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycleforge.toml");
        let mut config = EngineConfig::default();
        config.budgets.per_call_usd = 9.99;
        config.save(&path).unwrap();

        let orchestrator = Arc::new(Orchestrator::new(
            orchestrator.store.clone(),
            PhaseExecutor::new(orchestrator.router.clone(), orchestrator.ledger.clone(), orchestrator.guard.clone(), orchestrator.store.clone()),
            orchestrator.ledger.clone(),
            orchestrator.router.clone(),
            orchestrator.guard.clone(),
            orchestrator.config.clone(),
            path,
        ));

        orchestrator.reload_config().await;
        assert_eq!(orchestrator.guard.budgets().per_call_usd, 9.99);
        assert_eq!(orchestrator.config.read().await.budgets.per_call_usd, 9.99);
    }

    #[tokio::test]
    async fn trigger_rejects_when_busy() {
        let orchestrator = build_orchestrator();
        orchestrator.state.write().await.loop_state = LoopState::Scanning;
        let result = orchestrator.trigger(None).await;
        assert!(matches!(result, Err(PreconditionError::EngineBusy(_))));
    }

    #[tokio::test]
    async fn pause_then_resume_round_trips_idle() {
        let orchestrator = build_orchestrator();
        *orchestrator.running.write().await = true;
        orchestrator.pause().await;
        assert_eq!(orchestrator.get_state().await.loop_state, LoopState::Paused);
        orchestrator.resume().await;
        assert_eq!(orchestrator.get_state().await.loop_state, LoopState::Idle);
    }

    /// §6.3 `cost.summary`: `{total, byProvider, byPhase, runCount}`, not
    /// the daily/weekly pair the contract never names.
    #[tokio::test]
    async fn cost_summary_groups_by_provider_and_phase() {
        let orchestrator = build_orchestrator();
        orchestrator.ledger.record(crate::domain::CostRecord {
            timestamp: crate::domain::now(),
            phase: "scan".to_string(),
            task_id: None,
            provider: "gemini".to_string(),
            model: "m".to_string(),
            input_tokens: 10,
            output_tokens: 10,
            cost_usd: 0.5,
            latency_ms: 1,
        });
        orchestrator.ledger.record(crate::domain::CostRecord {
            timestamp: crate::domain::now(),
            phase: "plan".to_string(),
            task_id: None,
            provider: "openai".to_string(),
            model: "m".to_string(),
            input_tokens: 10,
            output_tokens: 10,
            cost_usd: 0.25,
            latency_ms: 1,
        });

        let summary = orchestrator.cost_summary();
        assert_eq!(summary.total_usd, 0.75);
        assert_eq!(summary.run_count, 2);
        assert_eq!(summary.by_provider.get("gemini"), Some(&0.5));
        assert_eq!(summary.by_provider.get("openai"), Some(&0.25));
        assert_eq!(summary.by_phase.get("scan"), Some(&0.5));
        assert_eq!(summary.by_phase.get("plan"), Some(&0.25));
    }

    /// §6.3 `tasks.detail`: joins the task with the Runs recorded against it.
    #[tokio::test]
    async fn task_detail_joins_task_with_its_runs() {
        let orchestrator = build_orchestrator();
        let task = crate::domain::Task::new(
            "o1",
            "c1",
            "Title",
            "Desc",
            crate::domain::AutonomyTier::T0,
            5.0,
            crate::domain::TaskState::Building,
        );
        orchestrator.store.save_task(&task).await;

        let matching_run = crate::domain::Run {
            id: "r1".to_string(),
            cycle_id: "c1".to_string(),
            task_id: Some(task.id.clone()),
            phase: "ship_check".to_string(),
            provider: "claude".to_string(),
            model: "m".to_string(),
            prompt: String::new(),
            response: None,
            success: true,
            error: None,
            tokens: 0,
            cost_usd: 0.0,
            latency_ms: 0,
            created_at: crate::domain::now(),
        };
        let other_run = crate::domain::Run { id: "r2".to_string(), task_id: Some("other".to_string()), ..matching_run.clone() };
        orchestrator.store.append_run(matching_run.clone()).await;
        orchestrator.store.append_run(other_run).await;

        let detail = orchestrator.task_detail(&task.id).await.unwrap();
        assert_eq!(detail.task.id, task.id);
        assert_eq!(detail.runs.len(), 1);
        assert_eq!(detail.runs[0].id, "r1");

        assert!(orchestrator.task_detail("missing").await.is_none());
    }

    /// §6.3 `config.set` / §7 ConfigurationError: an invalid mode is
    /// rejected at the boundary, no state change.
    #[tokio::test]
    async fn set_mode_rejects_invalid_mode_without_mutating_state() {
        let orchestrator = build_orchestrator();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycleforge.toml");
        let orchestrator = Arc::new(Orchestrator::new(
            orchestrator.store.clone(),
            PhaseExecutor::new(orchestrator.router.clone(), orchestrator.ledger.clone(), orchestrator.guard.clone(), orchestrator.store.clone()),
            orchestrator.ledger.clone(),
            orchestrator.router.clone(),
            orchestrator.guard.clone(),
            orchestrator.config.clone(),
            path,
        ));

        let err = orchestrator.set_mode("turbo").await.unwrap_err();
        assert!(matches!(err, crate::errors::ConfigError::InvalidMode(s) if s == "turbo"));
        assert_eq!(orchestrator.config.read().await.router.mode, RouterMode::Simulation);

        orchestrator.set_mode("live").await.unwrap();
        assert_eq!(orchestrator.config.read().await.router.mode, RouterMode::Live);
    }

    /// §6.3 `objectives.update` / §3 "weight clamped on write": the update
    /// path goes through `Objective::set_weight`, so an out-of-range value
    /// is clamped rather than stored verbatim.
    #[tokio::test]
    async fn update_objective_clamps_weight_on_write() {
        let orchestrator = build_orchestrator();
        let objective = Objective::new("Test", "");
        orchestrator.store.save_objective(&objective).await;

        let edit = crate::domain::ObjectiveUpdate {
            weight: Some(3.5),
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = orchestrator.update_objective(&objective.id, edit).await.unwrap();
        assert_eq!(updated.weight, 1.0);
        assert_eq!(updated.title, "Renamed");

        let err = orchestrator.update_objective("missing", crate::domain::ObjectiveUpdate::default()).await;
        assert!(err.is_err());
    }
}
