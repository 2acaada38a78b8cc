//! Thin CLI binary: parses arguments and drives the `cycleforge` library.
//! The control surface (§6.3) is transport-agnostic in the core; this is
//! one concrete, process-local consumer of it, built with `clap` the way
//! the teacher's `main.rs` is.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cycleforge::adapter::{MockAdapter, MockBuildWorker};
use cycleforge::approval;
use cycleforge::budget::BudgetGuard;
use cycleforge::config::{self, EngineConfig};
use cycleforge::domain::{Objective, ObjectiveStatus};
use cycleforge::ledger::CostLedger;
use cycleforge::orchestrator::Orchestrator;
use cycleforge::phase_executor::PhaseExecutor;
use cycleforge::router::Router;
use cycleforge::store::{JsonFileStore, Store};

#[derive(Parser)]
#[command(name = "cycleforge")]
#[command(version, about = "Autonomous work-cycle orchestrator")]
struct Cli {
    #[arg(long, global = true, default_value = "cycleforge.toml")]
    config: PathBuf,

    #[arg(long, global = true, default_value = ".cycleforge")]
    data_dir: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current EngineState snapshot.
    State,
    /// Run exactly one cycle synchronously, then exit.
    Trigger {
        #[arg(long)]
        preset: Option<String>,
    },
    Pause,
    Resume,
    Objectives {
        #[command(subcommand)]
        command: ObjectiveCommands,
    },
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List the tasks currently awaiting human approval.
    Approvals,
    Approve {
        task_id: String,
    },
    Reject {
        task_id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// `cost.summary`: totals by provider and phase.
    CostSummary,
    /// `budget.status`: the live budget caps.
    BudgetStatus,
}

#[derive(Subcommand)]
enum ObjectiveCommands {
    List,
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        weight: Option<f64>,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    List,
    Detail { id: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    Get,
    /// `config.set` mode variant: validated and rejected at the boundary
    /// on an unknown mode string (§7 ConfigurationError).
    SetMode { mode: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = EngineConfig::load_or_default(&cli.config).context("failed to load config")?;
    let data_dir = if cli.data_dir == Path::new(".cycleforge") {
        config.data_dir.clone()
    } else {
        cli.data_dir.clone()
    };

    let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(data_dir));
    let ledger = Arc::new(CostLedger::new());
    let guard = Arc::new(BudgetGuard::new(config.budgets.clone()));
    let router = Arc::new(Router::new(
        config.router.mode,
        config.router.enabled_providers.clone(),
        Arc::new(MockAdapter::default()),
        Arc::new(MockBuildWorker),
    ));
    let executor = PhaseExecutor::new(router.clone(), ledger.clone(), guard.clone(), store.clone());
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        executor,
        ledger.clone(),
        router,
        guard,
        config::shared(config),
        cli.config.clone(),
    ));

    match cli.command {
        Commands::State => {
            let state = orchestrator.get_state().await;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Trigger { preset } => {
            orchestrator.start().await;
            match orchestrator.trigger(preset.as_deref()).await {
                Ok(cycle_id) => println!("cycle {cycle_id} complete"),
                Err(e) => eprintln!("error: {e}"),
            }
            orchestrator.stop().await;
        }
        Commands::Pause => {
            orchestrator.pause().await;
            println!("paused");
        }
        Commands::Resume => {
            orchestrator.resume().await;
            println!("resumed");
        }
        Commands::Objectives { command } => match command {
            ObjectiveCommands::List => {
                let objectives = store.list_objectives().await;
                println!("{}", serde_json::to_string_pretty(&objectives)?);
            }
            ObjectiveCommands::Create { title, description } => {
                if title.trim().is_empty() {
                    anyhow::bail!("title must not be empty");
                }
                let mut objective = Objective::new(title, description);
                objective.status = ObjectiveStatus::Active;
                store.save_objective(&objective).await;
                println!("created {}", objective.id);
            }
            ObjectiveCommands::Update { id, title, description, weight } => {
                let edit = cycleforge::domain::ObjectiveUpdate {
                    title,
                    description,
                    weight,
                    status: None,
                    acceptance_criteria: None,
                    tags: None,
                };
                match orchestrator.update_objective(&id, edit).await {
                    Ok(objective) => println!("{}", serde_json::to_string_pretty(&objective)?),
                    Err(e) => eprintln!("error: {e}"),
                }
            }
        },
        Commands::Tasks { command } => match command {
            TaskCommands::List => {
                let tasks = store.list_tasks().await;
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            }
            TaskCommands::Detail { id } => match orchestrator.task_detail(&id).await {
                Some(detail) => println!("{}", serde_json::to_string_pretty(&detail)?),
                None => eprintln!("error: task {id} not found"),
            },
        },
        Commands::Config { command } => match command {
            ConfigCommands::Get => {
                let config = orchestrator.config_get().await;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommands::SetMode { mode } => match orchestrator.set_mode(&mode).await {
                Ok(()) => println!("mode set to {mode}"),
                Err(e) => eprintln!("error: {e}"),
            },
        },
        Commands::Approvals => {
            let pending = approval::list_awaiting_approval(store.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
        Commands::Approve { task_id } => match approval::approve(store.as_ref(), &task_id).await {
            Ok(task) => println!("approved {} -> {}", task.id, task.state.as_str()),
            Err(e) => eprintln!("error: {e}"),
        },
        Commands::Reject { task_id, reason } => {
            match approval::reject(store.as_ref(), &task_id, reason).await {
                Ok(task) => println!("rejected {} -> {}", task.id, task.state.as_str()),
                Err(e) => eprintln!("error: {e}"),
            }
        }
        Commands::CostSummary => {
            let summary = orchestrator.cost_summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::BudgetStatus => {
            let status = orchestrator.budget_status();
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
