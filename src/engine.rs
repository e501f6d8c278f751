//! Schedule generation driver.
//!
//! Runs the pipeline snapshot → candidate domain → model → solve → records,
//! and classifies the outcome. Generation is a pure function of the
//! snapshot and the configuration; nothing is cached between calls.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::audit::audit_schedule;
use crate::config::EngineConfig;
use crate::domain::CandidateDomain;
use crate::error::{EngineError, EngineResult};
use crate::kpi::TimetableKpi;
use crate::models::{ScheduleMetrics, ScheduleRecord};
use crate::snapshot::{Snapshot, SnapshotSource};
use crate::solver::{MipSolver, SolveStatus, TimetableSolver};
use crate::timetable::{assemble_schedule, TimetableMipBuilder};

/// Outcome of one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerateResult {
    /// Every section placed.
    Ok {
        /// `optimal` or `feasible`.
        solve_status: SolveStatus,
        schedule: Vec<ScheduleRecord>,
        metrics: ScheduleMetrics,
    },
    /// No assignment satisfies the hard constraints within the budget.
    Infeasible {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// The input or the backend is broken.
    Error { detail: String },
}

impl GenerateResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, GenerateResult::Ok { .. })
    }

    /// Wire value of the `status` tag.
    pub fn status(&self) -> &'static str {
        match self {
            GenerateResult::Ok { .. } => "ok",
            GenerateResult::Infeasible { .. } => "infeasible",
            GenerateResult::Error { .. } => "error",
        }
    }
}

impl From<EngineError> for GenerateResult {
    fn from(err: EngineError) -> Self {
        GenerateResult::Error {
            detail: err.to_string(),
        }
    }
}

/// Generates a timetable with the bundled MIP backend.
pub fn generate_schedule(snapshot: &Snapshot, config: &EngineConfig) -> GenerateResult {
    generate_with_solver(snapshot, config, &MipSolver::new())
}

/// Loads a snapshot from `source` and generates a timetable.
///
/// Loader failures (unreadable source, integrity violations) are reported
/// as [`GenerateResult::Error`].
pub fn generate_from_source<S: SnapshotSource>(source: &S, config: &EngineConfig) -> GenerateResult {
    match Snapshot::load(source) {
        Ok(snapshot) => generate_schedule(&snapshot, config),
        Err(e) => {
            error!(error = %e, "snapshot load failed");
            e.into()
        }
    }
}

/// Generates a timetable with a caller-supplied backend.
pub fn generate_with_solver<S: TimetableSolver>(
    snapshot: &Snapshot,
    config: &EngineConfig,
    solver: &S,
) -> GenerateResult {
    let started = Instant::now();
    let result = run(snapshot, config, solver).unwrap_or_else(|e| {
        error!(error = %e, "schedule generation failed");
        e.into()
    });
    info!(
        status = result.status(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "schedule generation finished"
    );
    result
}

fn run<S: TimetableSolver>(snapshot: &Snapshot, config: &EngineConfig, solver: &S) -> EngineResult<GenerateResult> {
    let domain = CandidateDomain::build(snapshot)?;
    let solver_config = config.solver.solver_config();
    let model = TimetableMipBuilder::new(snapshot, &domain)
        .with_objective(config.objective.clone())
        .build(&solver_config)?;
    let constraints = model.constraint_count();
    let solution = solver.solve(model, &solver_config);

    info!(
        sections = snapshot.section_count(),
        candidates = domain.len(),
        constraints,
        status = ?solution.status,
        objective = ?solution.objective,
        incumbent = solution.stats.incumbent_found,
        exact = solution.stats.exact_completed,
        solve_ms = solution.stats.time_total.as_millis() as u64,
        "solve finished"
    );

    match solution.status {
        SolveStatus::Optimal | SolveStatus::Feasible => {
            let schedule = assemble_schedule(snapshot, &domain, &solution.selected)?;

            let violations = audit_schedule(snapshot, &schedule);
            if !violations.is_empty() {
                let detail = violations
                    .iter()
                    .map(|v| v.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(EngineError::Backend(format!("solution failed audit: {detail}")));
            }

            let kpi = TimetableKpi::calculate(snapshot, &schedule, &config.objective);
            let metrics = kpi.metrics;
            if let Some(objective) = solution.objective {
                let recomputed = config.objective.weights.combine(
                    metrics.time_penalty,
                    metrics.consecutive_penalty,
                    metrics.workload_balance,
                );
                if (objective - recomputed as f64).abs() > 0.5 {
                    return Err(EngineError::Backend(format!(
                        "solver objective {objective} disagrees with schedule {metrics:?} (weighted {recomputed})"
                    )));
                }
            }
            debug!(
                avg_load = kpi.avg_load,
                avg_room_utilization = kpi.avg_room_utilization,
                "schedule kpi"
            );

            Ok(GenerateResult::Ok {
                solve_status: solution.status,
                schedule: schedule.records,
                metrics,
            })
        }
        SolveStatus::Infeasible => {
            warn!(reason = ?solution.reason, "no feasible timetable");
            Ok(GenerateResult::Infeasible {
                reason: solution.reason,
            })
        }
        SolveStatus::Error => Err(EngineError::Backend(
            solution
                .reason
                .unwrap_or_else(|| "solver reported an error".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Solution, SolverConfig, SolverStatistics};
    use crate::timetable::TimetableModel;
    use crate::models::{Course, DayPattern, Professor, Room, Section, TimeSlot};
    use crate::snapshot::SnapshotData;

    fn scenario_a() -> SnapshotData {
        SnapshotData::new()
            .with_course(Course::new(1, "Math 101", 3, DayPattern::Mwf).with_max_students(25))
            .with_professor(Professor::new(1, "Dr. Smith", 12))
            .with_room(Room::new(1, "Hall A", 30))
            .with_time_slot(TimeSlot::new(1, "11AM", DayPattern::Mwf))
            .with_section(Section::new(1, 1, 1))
            .with_eligibility(1, 1)
    }

    #[test]
    fn test_generate_ok() {
        let result = generate_from_source(&scenario_a(), &EngineConfig::default());
        match result {
            GenerateResult::Ok {
                solve_status,
                schedule,
                metrics,
            } => {
                assert_eq!(solve_status, SolveStatus::Optimal);
                assert_eq!(schedule.len(), 1);
                assert_eq!(schedule[0].start_time, "11AM");
                assert_eq!(metrics, ScheduleMetrics::default());
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }

    #[test]
    fn test_result_wire_format() {
        let ok = generate_from_source(&scenario_a(), &EngineConfig::default());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["solve_status"], "optimal");
        assert_eq!(json["metrics"]["time_penalty"], 0);
        assert_eq!(json["schedule"][0]["day_pattern"], "MWF");

        let infeasible = GenerateResult::Infeasible { reason: None };
        assert_eq!(serde_json::to_string(&infeasible).unwrap(), r#"{"status":"infeasible"}"#);

        let err = GenerateResult::Error {
            detail: "boom".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["detail"], "boom");
    }

    #[test]
    fn test_loader_failure_is_error() {
        let data = scenario_a().with_section(Section::new(2, 99, 1));
        let result = generate_from_source(&data, &EngineConfig::default());
        assert_eq!(result.status(), "error");
    }

    #[test]
    fn test_negative_weight_is_model_error() {
        let mut config = EngineConfig::default();
        config.objective.weights.time = -1;
        let snapshot = Snapshot::load(&scenario_a()).unwrap();
        match generate_schedule(&snapshot, &config) {
            GenerateResult::Error { detail } => assert!(detail.contains("model construction failed")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    /// A backend that claims success with an empty assignment.
    struct LyingSolver;

    impl TimetableSolver for LyingSolver {
        fn solve(&self, _model: TimetableModel, _config: &SolverConfig) -> Solution {
            Solution {
                status: SolveStatus::Optimal,
                selected: Vec::new(),
                objective: Some(0.0),
                reason: None,
                stats: SolverStatistics::default(),
            }
        }
    }

    /// A backend that returns the incumbent with a wrong objective value.
    struct MiscountingSolver;

    impl TimetableSolver for MiscountingSolver {
        fn solve(&self, model: TimetableModel, _config: &SolverConfig) -> Solution {
            Solution {
                status: SolveStatus::Optimal,
                selected: model.incumbent().map(<[_]>::to_vec).unwrap_or_default(),
                objective: Some(42.0),
                reason: None,
                stats: SolverStatistics::default(),
            }
        }
    }

    #[test]
    fn test_audit_rejects_bad_backend_solution() {
        let snapshot = Snapshot::load(&scenario_a()).unwrap();
        match generate_with_solver(&snapshot, &EngineConfig::default(), &LyingSolver) {
            GenerateResult::Error { detail } => {
                assert!(detail.contains("solution failed audit"), "{detail}");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_objective_mismatch_rejected() {
        let snapshot = Snapshot::load(&scenario_a()).unwrap();
        match generate_with_solver(&snapshot, &EngineConfig::default(), &MiscountingSolver) {
            GenerateResult::Error { detail } => assert!(detail.contains("disagrees"), "{detail}"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_budget_returns_feasible_incumbent() {
        let snapshot = Snapshot::load(&scenario_a()).unwrap();
        let config = EngineConfig::default().with_time_limit_ms(0);
        match generate_schedule(&snapshot, &config) {
            GenerateResult::Ok {
                solve_status, schedule, ..
            } => {
                assert_eq!(solve_status, SolveStatus::Feasible);
                assert_eq!(schedule.len(), 1);
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }
}
