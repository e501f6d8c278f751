//! Solver seam and the bundled MIP backend.
//!
//! A [`TimetableModel`] is a binary integer program: one binary per
//! candidate, linear hard constraints, and a linear objective over the
//! decision variables plus a few continuous auxiliaries. Any type
//! implementing [`TimetableSolver`] can solve it; [`MipSolver`] hands it to
//! `good_lp` under a wall-clock budget.
//!
//! # Outcomes
//!
//! | Status | Meaning |
//! |--------|---------|
//! | `Optimal` | Exact search finished with a solution |
//! | `Feasible` | Budget expired; the constructed incumbent is returned |
//! | `Infeasible` | Proven infeasible, or budget expired with no incumbent |
//! | `Error` | The backend failed |
//!
//! # Reference
//! - Wolsey (1998), "Integer Programming"

mod mip;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::CandidateIndex;
use crate::timetable::TimetableModel;

pub use mip::MipSolver;

/// Reason reported when the budget expires before any assignment is known.
pub const TIME_BUDGET_EXHAUSTED: &str = "time budget exhausted before a feasible assignment was found";

/// Reason reported when the exact search proves infeasibility.
pub const NO_FEASIBLE_ASSIGNMENT: &str = "no assignment satisfies every hard constraint";

/// Search budget and determinism controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Wall-clock budget of the exact search.
    pub time_limit: Duration,
    /// Extra shuffled attempts of the constructive pass after the first.
    pub restarts: u32,
    /// Seed of the shuffled attempts.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(30),
            restarts: 8,
            seed: 0,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_restarts(mut self, restarts: u32) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Outcome classification of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Error,
}

/// Model size and timing of one solve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverStatistics {
    pub variables: usize,
    pub constraints: usize,
    /// Whether the constructive pass produced an incumbent.
    pub incumbent_found: bool,
    /// Whether the exact search returned before the deadline.
    pub exact_completed: bool,
    pub time_total: Duration,
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolveStatus,
    /// Selected candidates, ascending (empty when none was found).
    pub selected: Vec<CandidateIndex>,
    /// Objective value reported by the exact search.
    pub objective: Option<f64>,
    /// Why no solution is returned, for `Infeasible` and `Error`.
    pub reason: Option<String>,
    pub stats: SolverStatistics,
}

impl Solution {
    /// Whether an assignment is available.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub(crate) fn failed(status: SolveStatus, reason: impl Into<String>, stats: SolverStatistics) -> Self {
        Self {
            status,
            selected: Vec::new(),
            objective: None,
            reason: Some(reason.into()),
            stats,
        }
    }
}

/// A backend able to minimize a [`TimetableModel`].
///
/// The model is passed by value so a backend may move it onto a worker.
pub trait TimetableSolver {
    fn solve(&self, model: TimetableModel, config: &SolverConfig) -> Solution;
}
