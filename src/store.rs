//! Store contract (§6.1): typed load/save for singular entities and
//! collections, plus append-only streams. The core depends only on the
//! `Store` trait; persistence format is an external concern.
//!
//! `MemoryStore` backs `simulation` mode and most unit tests.
//! `JsonFileStore` persists each singular entity/collection as one JSON
//! file and each append-only stream as newline-delimited JSON, directly
//! grounded on the teacher's `audit::logger::AuditLogger` (current-run vs.
//! historical run files) and `orchestrator::state::StateManager`'s
//! line-oriented append file. `save_x` is atomic via write-to-temp-then-rename.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    BudgetConfig, Cycle, DecisionLogEntry, EngineState, Evaluation, ExperimentLogEntry, Objective,
    Plan, Run, Scan, Task,
};
use crate::errors::ConfigError;

#[async_trait]
pub trait Store: Send + Sync {
    async fn load_engine_state(&self) -> EngineState;
    async fn save_engine_state(&self, state: &EngineState);

    async fn load_budget_config(&self) -> Option<BudgetConfig>;
    async fn save_budget_config(&self, config: &BudgetConfig);

    async fn list_objectives(&self) -> Vec<Objective>;
    async fn save_objective(&self, objective: &Objective);
    async fn delete_objective(&self, id: &str);

    async fn list_tasks(&self) -> Vec<Task>;
    async fn get_task(&self, id: &str) -> Option<Task>;
    async fn save_task(&self, task: &Task);

    async fn list_cycles(&self) -> Vec<Cycle>;
    async fn save_cycle(&self, cycle: &Cycle);

    async fn append_scan(&self, scan: Scan);
    async fn list_scans(&self) -> Vec<Scan>;

    async fn append_plan(&self, plan: Plan);
    async fn list_plans(&self) -> Vec<Plan>;

    async fn append_run(&self, run: Run);
    async fn list_runs(&self) -> Vec<Run>;

    async fn append_evaluation(&self, eval: Evaluation);
    async fn list_evaluations(&self) -> Vec<Evaluation>;

    async fn append_decision(&self, entry: DecisionLogEntry);
    async fn list_decisions(&self) -> Vec<DecisionLogEntry>;

    async fn append_experiment(&self, entry: ExperimentLogEntry);
    async fn list_experiments(&self) -> Vec<ExperimentLogEntry>;
}

#[derive(Default)]
struct MemoryInner {
    engine_state: Option<EngineState>,
    budget_config: Option<BudgetConfig>,
    objectives: HashMap<String, Objective>,
    tasks: HashMap<String, Task>,
    cycles: Vec<Cycle>,
    scans: Vec<Scan>,
    plans: Vec<Plan>,
    runs: Vec<Run>,
    evaluations: Vec<Evaluation>,
    decisions: Vec<DecisionLogEntry>,
    experiments: Vec<ExperimentLogEntry>,
}

pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(MemoryInner::default()),
        }
    }
}

macro_rules! lock_r {
    ($self:ident) => {
        $self.inner.read().expect("memory store lock poisoned")
    };
}
macro_rules! lock_w {
    ($self:ident) => {
        $self.inner.write().expect("memory store lock poisoned")
    };
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_engine_state(&self) -> EngineState {
        lock_r!(self).engine_state.clone().unwrap_or_default()
    }

    async fn save_engine_state(&self, state: &EngineState) {
        lock_w!(self).engine_state = Some(state.clone());
    }

    async fn load_budget_config(&self) -> Option<BudgetConfig> {
        lock_r!(self).budget_config.clone()
    }

    async fn save_budget_config(&self, config: &BudgetConfig) {
        lock_w!(self).budget_config = Some(config.clone());
    }

    async fn list_objectives(&self) -> Vec<Objective> {
        lock_r!(self).objectives.values().cloned().collect()
    }

    async fn save_objective(&self, objective: &Objective) {
        lock_w!(self)
            .objectives
            .insert(objective.id.clone(), objective.clone());
    }

    async fn delete_objective(&self, id: &str) {
        lock_w!(self).objectives.remove(id);
    }

    async fn list_tasks(&self) -> Vec<Task> {
        lock_r!(self).tasks.values().cloned().collect()
    }

    async fn get_task(&self, id: &str) -> Option<Task> {
        lock_r!(self).tasks.get(id).cloned()
    }

    async fn save_task(&self, task: &Task) {
        lock_w!(self).tasks.insert(task.id.clone(), task.clone());
    }

    async fn list_cycles(&self) -> Vec<Cycle> {
        lock_r!(self).cycles.clone()
    }

    async fn save_cycle(&self, cycle: &Cycle) {
        let mut inner = lock_w!(self);
        if let Some(existing) = inner.cycles.iter_mut().find(|c| c.id == cycle.id) {
            *existing = cycle.clone();
        } else {
            inner.cycles.push(cycle.clone());
        }
    }

    async fn append_scan(&self, scan: Scan) {
        lock_w!(self).scans.push(scan);
    }

    async fn list_scans(&self) -> Vec<Scan> {
        lock_r!(self).scans.clone()
    }

    async fn append_plan(&self, plan: Plan) {
        lock_w!(self).plans.push(plan);
    }

    async fn list_plans(&self) -> Vec<Plan> {
        lock_r!(self).plans.clone()
    }

    async fn append_run(&self, run: Run) {
        lock_w!(self).runs.push(run);
    }

    async fn list_runs(&self) -> Vec<Run> {
        lock_r!(self).runs.clone()
    }

    async fn append_evaluation(&self, eval: Evaluation) {
        lock_w!(self).evaluations.push(eval);
    }

    async fn list_evaluations(&self) -> Vec<Evaluation> {
        lock_r!(self).evaluations.clone()
    }

    async fn append_decision(&self, entry: DecisionLogEntry) {
        lock_w!(self).decisions.push(entry);
    }

    async fn list_decisions(&self) -> Vec<DecisionLogEntry> {
        lock_r!(self).decisions.clone()
    }

    async fn append_experiment(&self, entry: ExperimentLogEntry) {
        lock_w!(self).experiments.push(entry);
    }

    async fn list_experiments(&self) -> Vec<ExperimentLogEntry> {
        lock_r!(self).experiments.clone()
    }
}

/// Filesystem-backed store under a `.cycleforge/` directory: one JSON file
/// per singular entity/collection, one newline-delimited JSON file per
/// append-only stream.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn stream_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.ndjson"))
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.root).map_err(|source| ConfigError::WriteFailed {
            path: self.root.clone(),
            source,
        })?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(|source| ConfigError::WriteFailed {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_json<T: for<'de> Deserialize<'de> + Default>(&self, name: &str) -> T {
        let path = self.path(name);
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) {
        if let Ok(text) = serde_json::to_string_pretty(value) {
            let _ = self.write_atomic(&self.path(name), &text);
        }
    }

    fn append_line<T: Serialize>(&self, name: &str, value: &T) {
        use std::io::Write;
        if std::fs::create_dir_all(&self.root).is_err() {
            return;
        }
        if let Ok(line) = serde_json::to_string(value)
            && let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(self.stream_path(name))
        {
            let _ = writeln!(file, "{line}");
        }
    }

    fn read_lines<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Vec<T> {
        std::fs::read_to_string(self.stream_path(name))
            .unwrap_or_default()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load_engine_state(&self) -> EngineState {
        self.load_json("engine_state")
    }

    async fn save_engine_state(&self, state: &EngineState) {
        self.save_json("engine_state", state);
    }

    async fn load_budget_config(&self) -> Option<BudgetConfig> {
        let path = self.path("budget_config");
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
    }

    async fn save_budget_config(&self, config: &BudgetConfig) {
        self.save_json("budget_config", config);
    }

    async fn list_objectives(&self) -> Vec<Objective> {
        self.load_json("objectives")
    }

    async fn save_objective(&self, objective: &Objective) {
        let mut all: Vec<Objective> = self.load_json("objectives");
        if let Some(existing) = all.iter_mut().find(|o| o.id == objective.id) {
            *existing = objective.clone();
        } else {
            all.push(objective.clone());
        }
        self.save_json("objectives", &all);
    }

    async fn delete_objective(&self, id: &str) {
        let mut all: Vec<Objective> = self.load_json("objectives");
        all.retain(|o| o.id != id);
        self.save_json("objectives", &all);
    }

    async fn list_tasks(&self) -> Vec<Task> {
        self.load_json("tasks")
    }

    async fn get_task(&self, id: &str) -> Option<Task> {
        let all: Vec<Task> = self.load_json("tasks");
        all.into_iter().find(|t| t.id == id)
    }

    async fn save_task(&self, task: &Task) {
        let mut all: Vec<Task> = self.load_json("tasks");
        if let Some(existing) = all.iter_mut().find(|t| t.id == task.id) {
            *existing = task.clone();
        } else {
            all.push(task.clone());
        }
        self.save_json("tasks", &all);
    }

    async fn list_cycles(&self) -> Vec<Cycle> {
        self.load_json("cycles")
    }

    async fn save_cycle(&self, cycle: &Cycle) {
        let mut all: Vec<Cycle> = self.load_json("cycles");
        if let Some(existing) = all.iter_mut().find(|c| c.id == cycle.id) {
            *existing = cycle.clone();
        } else {
            all.push(cycle.clone());
        }
        self.save_json("cycles", &all);
    }

    async fn append_scan(&self, scan: Scan) {
        self.append_line("scans", &scan);
    }

    async fn list_scans(&self) -> Vec<Scan> {
        self.read_lines("scans")
    }

    async fn append_plan(&self, plan: Plan) {
        self.append_line("plans", &plan);
    }

    async fn list_plans(&self) -> Vec<Plan> {
        self.read_lines("plans")
    }

    async fn append_run(&self, run: Run) {
        self.append_line("runs", &run);
    }

    async fn list_runs(&self) -> Vec<Run> {
        self.read_lines("runs")
    }

    async fn append_evaluation(&self, eval: Evaluation) {
        self.append_line("evaluations", &eval);
    }

    async fn list_evaluations(&self) -> Vec<Evaluation> {
        self.read_lines("evaluations")
    }

    async fn append_decision(&self, entry: DecisionLogEntry) {
        self.append_line("decisions", &entry);
    }

    async fn list_decisions(&self) -> Vec<DecisionLogEntry> {
        self.read_lines("decisions")
    }

    async fn append_experiment(&self, entry: ExperimentLogEntry) {
        self.append_line("experiments", &entry);
    }

    async fn list_experiments(&self) -> Vec<ExperimentLogEntry> {
        self.read_lines("experiments")
    }
}
