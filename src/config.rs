//! TOML-backed configuration, hot-reloadable the way the teacher's
//! `ForgeToml` is: parsed once at startup, then swapped behind a shared
//! `Arc<RwLock<_>>` so `updateConfig`/`updateBudgets` never require a
//! restart (§9 "Hot-reload of config").

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::BudgetConfig;
use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterMode {
    #[default]
    Simulation,
    Selective,
    Live,
}

impl RouterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterMode::Simulation => "simulation",
            RouterMode::Selective => "selective",
            RouterMode::Live => "live",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "simulation" => Ok(RouterMode::Simulation),
            "selective" => Ok(RouterMode::Selective),
            "live" => Ok(RouterMode::Live),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub mode: RouterMode,
    /// Per-provider enable flags, consulted only in `selective` mode (§4.4).
    #[serde(default)]
    pub enabled_providers: HashMap<String, bool>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: RouterMode::Simulation,
            enabled_providers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Command to shell out to for the process text adapter, e.g. "claude".
    #[serde(default = "default_adapter_command")]
    pub command: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_adapter_command() -> String {
    "claude".to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            command: default_adapter_command(),
            extra_args: Vec::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_cooldown_minutes() -> u64 {
    15
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".cycleforge")
}

/// Top-level engine configuration, the `cycleforge.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_cooldown_minutes")]
    pub cycle_cooldown_minutes: u64,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub budgets: BudgetConfig,
    #[serde(default)]
    pub adapter: AdapterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cycle_cooldown_minutes: default_cooldown_minutes(),
            router: RouterConfig::default(),
            budgets: BudgetConfig::default(),
            adapter: AdapterConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = toml::from_str(&text)?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    /// Mirrors the teacher's `ForgeToml::load_or_default`.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self).expect("EngineConfig always serializes");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, text).map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Shared handle so the Router and Budget Guard can both read the live
/// config without the Orchestrator losing its position as the sole writer.
pub type SharedConfig = Arc<RwLock<EngineConfig>>;

pub fn shared(config: EngineConfig) -> SharedConfig {
    Arc::new(RwLock::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_or_default_falls_back_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cycleforge.toml");
        let config = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(config.cycle_cooldown_minutes, 15);
        assert_eq!(config.router.mode, RouterMode::Simulation);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cycleforge.toml");
        let mut config = EngineConfig::default();
        config.router.mode = RouterMode::Live;
        config.budgets.per_call_usd = 2.5;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.router.mode, RouterMode::Live);
        assert_eq!(loaded.budgets.per_call_usd, 2.5);
    }

    #[test]
    fn mode_parse_rejects_unknown_string() {
        let err = RouterMode::parse("turbo").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMode(s) if s == "turbo"));
    }
}
