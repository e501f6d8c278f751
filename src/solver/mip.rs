//! `good_lp` backend with a wall-clock deadline.
//!
//! The exact search runs on a worker thread. If it does not answer within
//! the budget, the constructive incumbent is returned as `Feasible`; a
//! worker still running at that point is detached and its result dropped.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use good_lp::{default_solver, Expression, ResolutionError, Solution as _, SolverModel, Variable};
use tracing::{debug, info, warn};

use crate::domain::CandidateIndex;
use crate::timetable::{Formulation, TimetableModel};

use super::{
    Solution, SolveStatus, SolverConfig, SolverStatistics, TimetableSolver, NO_FEASIBLE_ASSIGNMENT,
    TIME_BUDGET_EXHAUSTED,
};

/// Solves timetable models with the bundled `good_lp` MIP solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MipSolver;

impl MipSolver {
    pub fn new() -> Self {
        Self
    }
}

impl TimetableSolver for MipSolver {
    fn solve(&self, model: TimetableModel, config: &SolverConfig) -> Solution {
        let started = Instant::now();
        let mut stats = SolverStatistics {
            variables: model.variable_count(),
            constraints: model.constraint_count(),
            incumbent_found: model.incumbent.is_some(),
            ..SolverStatistics::default()
        };
        let TimetableModel {
            formulation,
            x,
            objective,
            incumbent,
            ..
        } = model;

        if x.is_empty() {
            stats.exact_completed = true;
            return Solution {
                status: SolveStatus::Optimal,
                selected: Vec::new(),
                objective: Some(0.0),
                reason: None,
                stats,
            };
        }

        if config.time_limit.is_zero() {
            return expired(incumbent, stats, started);
        }

        info!(
            variables = stats.variables,
            constraints = stats.constraints,
            time_limit_ms = config.time_limit.as_millis() as u64,
            "starting exact search"
        );
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("u-timetable-mip".into())
            .spawn(move || {
                // The receiver is gone once the deadline has passed.
                let _ = tx.send(solve_exact(formulation, objective, &x));
            });
        if let Err(e) = spawned {
            stats.time_total = started.elapsed();
            return Solution::failed(SolveStatus::Error, format!("cannot start exact search: {e}"), stats);
        }

        let outcome = rx.recv_timeout(config.time_limit);
        stats.time_total = started.elapsed();
        match outcome {
            Ok(Ok((selected, value))) => {
                stats.exact_completed = true;
                debug!(objective = value, selected = selected.len(), elapsed = ?stats.time_total, "exact search finished");
                Solution {
                    status: SolveStatus::Optimal,
                    selected,
                    objective: Some(value),
                    reason: None,
                    stats,
                }
            }
            Ok(Err(ResolutionError::Infeasible)) => {
                stats.exact_completed = true;
                debug!(elapsed = ?stats.time_total, "exact search proved infeasibility");
                Solution::failed(SolveStatus::Infeasible, NO_FEASIBLE_ASSIGNMENT, stats)
            }
            Ok(Err(e)) => {
                stats.exact_completed = true;
                warn!(error = %e, "exact search failed");
                Solution::failed(SolveStatus::Error, format!("exact search failed: {e}"), stats)
            }
            Err(RecvTimeoutError::Timeout) => expired(incumbent, stats, started),
            Err(RecvTimeoutError::Disconnected) => {
                warn!("exact search stopped without a result");
                Solution::failed(SolveStatus::Error, "exact search stopped without a result", stats)
            }
        }
    }
}

/// Outcome once the budget is spent without an exact answer.
fn expired(incumbent: Option<Vec<CandidateIndex>>, mut stats: SolverStatistics, started: Instant) -> Solution {
    stats.time_total = started.elapsed();
    match incumbent {
        Some(selected) => {
            warn!(selected = selected.len(), "time budget exhausted, returning constructed incumbent");
            Solution {
                status: SolveStatus::Feasible,
                selected,
                objective: None,
                reason: None,
                stats,
            }
        }
        None => {
            warn!("time budget exhausted with no incumbent");
            Solution::failed(SolveStatus::Infeasible, TIME_BUDGET_EXHAUSTED, stats)
        }
    }
}

fn solve_exact(
    formulation: Formulation,
    objective: Expression,
    x: &[Variable],
) -> Result<(Vec<CandidateIndex>, f64), ResolutionError> {
    let Formulation { vars, constraints, .. } = formulation;
    let problem = constraints
        .into_iter()
        .fold(vars.minimise(objective.clone()).using(default_solver), |p, (_, c)| p.with(c));
    let solution = problem.solve()?;

    let selected = x
        .iter()
        .enumerate()
        .filter(|(_, v)| solution.value(**v) > 0.5)
        .map(|(i, _)| CandidateIndex(i))
        .collect();
    Ok((selected, solution.eval(objective)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::CandidateDomain;
    use crate::models::{Course, DayPattern, Professor, Room, Section, TimeSlot};
    use crate::snapshot::{Snapshot, SnapshotData};
    use crate::timetable::TimetableMipBuilder;

    fn one_room(sections: u32, slots: u32) -> Snapshot {
        let mut data = SnapshotData::new()
            .with_course(Course::new(1, "Math", 3, DayPattern::Mwf).with_max_students(10))
            .with_professor(Professor::new(1, "Dr. A", 30))
            .with_room(Room::new(1, "R1", 20))
            .with_eligibility(1, 1);
        let labels = ["8AM", "9:30AM", "11AM", "12:30PM", "2PM", "3:30PM"];
        for s in 1..=slots {
            data = data.with_time_slot(TimeSlot::new(s, labels[(s - 1) as usize], DayPattern::Mwf));
        }
        for s in 1..=sections {
            data = data.with_section(Section::new(s, 1, s));
        }
        Snapshot::from_data(data).unwrap()
    }

    fn solve(snapshot: &Snapshot, config: &SolverConfig) -> Solution {
        let domain = CandidateDomain::build(snapshot).unwrap();
        TimetableMipBuilder::new(snapshot, &domain)
            .solve(&MipSolver::new(), config)
            .unwrap()
    }

    #[test]
    fn test_optimal_solution() {
        let sol = solve(&one_room(1, 3), &SolverConfig::default());
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.selected.len(), 1);
        assert!(sol.stats.exact_completed);
        // 11AM is free of penalty.
        assert!(sol.objective.unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_proven() {
        let sol = solve(&one_room(3, 2), &SolverConfig::default());
        assert_eq!(sol.status, SolveStatus::Infeasible);
        assert_eq!(sol.reason.as_deref(), Some(NO_FEASIBLE_ASSIGNMENT));
        assert!(sol.selected.is_empty());
    }

    #[test]
    fn test_zero_budget_returns_incumbent() {
        let config = SolverConfig::default().with_time_limit(Duration::ZERO);
        let sol = solve(&one_room(2, 3), &config);
        assert_eq!(sol.status, SolveStatus::Feasible);
        assert_eq!(sol.selected.len(), 2);
        assert!(sol.objective.is_none());
        assert!(sol.stats.incumbent_found);
        assert!(!sol.stats.exact_completed);
    }

    #[test]
    fn test_zero_budget_without_incumbent() {
        let config = SolverConfig::default().with_time_limit(Duration::ZERO);
        let sol = solve(&one_room(3, 2), &config);
        assert_eq!(sol.status, SolveStatus::Infeasible);
        assert_eq!(sol.reason.as_deref(), Some(TIME_BUDGET_EXHAUSTED));
    }

    #[test]
    fn test_empty_model_is_optimal() {
        let snapshot = Snapshot::from_data(SnapshotData::new()).unwrap();
        let sol = solve(&snapshot, &SolverConfig::default());
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert!(sol.selected.is_empty());
    }
}
