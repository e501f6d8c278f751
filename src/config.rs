//! Engine and server configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file is a
//! valid configuration:
//!
//! ```toml
//! [objective]
//! consecutive = "pair_count"
//!
//! [objective.weights]
//! time = 1
//! consecutive = 1
//! balance = 1
//!
//! [solver]
//! time_limit_ms = 30000
//! restarts = 8
//! seed = 0
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! max_concurrent_solves = 1
//! max_time_limit_ms = 60000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solver::SolverConfig;
use crate::timetable::ObjectiveConfig;

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Objective and search settings of one solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub objective: ObjectiveConfig,
    pub solver: SolverSettings,
}

/// Search budget as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub time_limit_ms: u64,
    /// Shuffled retries of the constructive pass.
    pub restarts: u32,
    pub seed: u64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_ms: 30_000,
            restarts: 8,
            seed: 0,
        }
    }
}

impl SolverSettings {
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            time_limit: Duration::from_millis(self.time_limit_ms),
            restarts: self.restarts,
            seed: self.seed,
        }
    }
}

/// HTTP binding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Solves allowed to run at once; further requests wait.
    pub max_concurrent_solves: usize,
    /// Upper bound on a client-requested budget.
    pub max_time_limit_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            max_concurrent_solves: 1,
            max_time_limit_ms: 60_000,
        }
    }
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    pub server: ServerConfig,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }

    /// Overrides the wall-clock budget.
    pub fn with_time_limit_ms(mut self, time_limit_ms: u64) -> Self {
        self.solver.time_limit_ms = time_limit_ms;
        self
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::ConsecutivePenalty;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        let solver = cfg.solver.solver_config();
        assert_eq!(solver.time_limit, Duration::from_secs(30));
        assert_eq!(solver.restarts, 8);
        assert_eq!(solver.seed, 0);
    }

    #[test]
    fn test_parse_engine_config() {
        let cfg = EngineConfig::from_toml_str(
            r#"
[objective]
consecutive = "triangular"

[objective.weights]
time = 2

[solver]
time_limit_ms = 500
restarts = 2
seed = 7
"#,
        )
        .unwrap();
        assert_eq!(cfg.objective.consecutive, ConsecutivePenalty::Triangular);
        assert_eq!(cfg.objective.weights.time, 2);
        assert_eq!(cfg.objective.weights.balance, 1);
        assert_eq!(cfg.solver.solver_config().time_limit, Duration::from_millis(500));
        assert_eq!(cfg.solver.solver_config().restarts, 2);
        assert_eq!(cfg.solver.solver_config().seed, 7);
    }

    #[test]
    fn test_app_config_sections() {
        let cfg = AppConfig::from_toml_str(
            r#"
[solver]
seed = 3

[server]
bind = "0.0.0.0:9000"
"#,
        )
        .unwrap();
        assert_eq!(cfg.engine.solver.seed, 3);
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.server.max_concurrent_solves, 1);
        assert_eq!(cfg.server.max_time_limit_ms, 60_000);
    }

    #[test]
    fn test_invalid_config() {
        let err = EngineConfig::from_toml_str("[solver]\ntime_limit_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/u-timetable.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }

    #[test]
    fn test_time_limit_override() {
        let cfg = EngineConfig::default().with_time_limit_ms(250);
        assert_eq!(cfg.solver.time_limit_ms, 250);
    }
}
