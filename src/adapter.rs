//! Adapter contract (§6.2): the core sees a text-generation capability and
//! a build/review capability, nothing about concrete backends.
//!
//! `ProcessTextAdapter` is the one real adapter shape the core ships,
//! grounded on the teacher's `orchestrator::runner::ClaudeRunner::run_iteration`:
//! shell out via `tokio::process::Command`, write the prompt to stdin, read
//! stdout, then extract a trailing JSON object the way
//! `review::dispatcher::extract_json` strips markdown fences and finds
//! balanced braces before giving up. `MockAdapter`/`MockBuildWorker` give
//! `simulation` mode and tests a deterministic, zero-cost stand-in.

use std::process::Stdio;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, AsyncReadExt};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::domain::{Artifact, ArtifactType, Task};
use crate::errors::AdapterError;

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub json_mode: bool,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
    pub cost_usd: f64,
}

#[async_trait]
pub trait TextGenAdapter: Send + Sync {
    fn provider(&self) -> &str;
    fn model(&self) -> &str;
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, AdapterError>;
}

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub output: String,
    pub success: bool,
    pub error: Option<String>,
    pub artifacts: Vec<Artifact>,
    pub latency_ms: u64,
    pub cost_usd: f64,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub approved: bool,
    pub issues: Vec<String>,
    pub summary: String,
    pub latency_ms: u64,
    pub cost_usd: f64,
}

#[async_trait]
pub trait BuildWorker: Send + Sync {
    async fn execute(&self, instruction: &str, working_dir: &str, context: &str) -> Result<BuildResult, AdapterError>;
    async fn check(&self, task: &Task, build_result: &BuildResult) -> Result<CheckResult, AdapterError>;
}

/// Extracts the trailing JSON object from adapter stdout: try a direct
/// parse first, then strip markdown fences, then a balanced-brace scan
/// from the last `{`. Never fatal — callers fall back to a sentinel record
/// on failure rather than propagating (§9 "Parsing discipline").
pub fn extract_json(raw: &str) -> Option<serde_json::Value> {
    let trimmed = raw.trim();
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Some(v);
    }

    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed)
        .trim_end_matches("```")
        .trim();
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(stripped) {
        return Some(v);
    }

    let start = stripped.find('{')?;
    let bytes = stripped.as_bytes();
    let mut depth = 0i32;
    let mut end = None;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let end = end?;
    serde_json::from_str(&stripped[start..=end]).ok()
}

/// Shells out to a configurable CLI command, writes the prompt to stdin,
/// and reads a trailing JSON object from stdout.
pub struct ProcessTextAdapter {
    command: String,
    extra_args: Vec<String>,
    provider: String,
    model: String,
    timeout: Duration,
}

impl ProcessTextAdapter {
    pub fn new(command: impl Into<String>, extra_args: Vec<String>, provider: impl Into<String>, model: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            command: command.into(),
            extra_args,
            provider: provider.into(),
            model: model.into(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl TextGenAdapter for ProcessTextAdapter {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, AdapterError> {
        let started = Instant::now();
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(AdapterError::SpawnFailed)?;

        let prompt = match &req.system_prompt {
            Some(sys) => format!("{sys}\n\n{}", req.user_prompt),
            None => req.user_prompt.clone(),
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(AdapterError::Io)?;
        }

        let wait = async {
            let status = child.wait().await.map_err(AdapterError::Io)?;
            let mut stdout = String::new();
            if let Some(mut out) = child.stdout.take() {
                out.read_to_string(&mut stdout).await.map_err(AdapterError::Io)?;
            }
            Ok::<_, AdapterError>((status, stdout))
        };

        let (status, stdout) = timeout(self.timeout, wait)
            .await
            .map_err(|_| AdapterError::Timeout(self.timeout.as_millis() as u64))??;

        if !status.success() {
            return Err(AdapterError::NonZeroExit {
                code: status.code().unwrap_or(-1),
            });
        }

        let latency_ms = started.elapsed().as_millis() as u64;

        if req.json_mode {
            extract_json(&stdout).ok_or_else(|| AdapterError::ParseFailed(stdout.clone()))?;
        }

        Ok(GenerateResponse {
            text: stdout,
            input_tokens: 0,
            output_tokens: 0,
            latency_ms,
            cost_usd: 0.0,
        })
    }
}

/// Deterministic, zero-cost stand-in for `simulation` mode and tests.
pub struct MockAdapter {
    responses: Mutex<Vec<String>>,
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
        }
    }
}

impl MockAdapter {
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl TextGenAdapter for MockAdapter {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _req: GenerateRequest) -> Result<GenerateResponse, AdapterError> {
        let mut responses = self.responses.lock().expect("mock lock poisoned");
        let text = if responses.is_empty() {
            "{}".to_string()
        } else {
            responses.remove(0)
        };
        Ok(GenerateResponse {
            text,
            input_tokens: 0,
            output_tokens: 0,
            latency_ms: 0,
            cost_usd: 0.0,
        })
    }
}

#[derive(Default)]
pub struct MockBuildWorker;

#[async_trait]
impl BuildWorker for MockBuildWorker {
    async fn execute(&self, instruction: &str, _working_dir: &str, _context: &str) -> Result<BuildResult, AdapterError> {
        Ok(BuildResult {
            output: format!("simulated: {instruction}"),
            success: true,
            error: None,
            artifacts: vec![Artifact {
                artifact_type: ArtifactType::Log,
                value: "simulated-run".to_string(),
                description: None,
            }],
            latency_ms: 0,
            cost_usd: 0.0,
        })
    }

    async fn check(&self, _task: &Task, _build_result: &BuildResult) -> Result<CheckResult, AdapterError> {
        Ok(CheckResult {
            approved: true,
            issues: Vec::new(),
            summary: "simulated approval".to_string(),
            latency_ms: 0,
            cost_usd: 0.0,
        })
    }
}
