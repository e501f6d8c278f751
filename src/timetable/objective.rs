//! Soft-penalty objective.
//!
//! Three totals are derived from the decision variables:
//! - **time penalty**: per-candidate cost of its start slot
//! - **consecutive penalty**: back-to-back classes per professor
//! - **workload balance**: max minus min professor credit load
//!
//! and combined as `w_time·time + w_consec·consecutive + w_balance·balance`.

use std::collections::BTreeMap;

use good_lp::{constraint, Expression, Variable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Candidate, CandidateDomain};
use crate::models::{DayPattern, ProfessorId, TimeSlotId};
use crate::snapshot::Snapshot;

use super::builder::Formulation;

/// Start-slot penalties.
///
/// A slot is scored by its label when the label is listed, otherwise by
/// its zero-based position within its day pattern. Positions past the end
/// of the table score 0. The default lists the standard six daily labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePenaltyTable {
    pub positions: Vec<i64>,
    pub labels: BTreeMap<String, i64>,
}

impl Default for TimePenaltyTable {
    fn default() -> Self {
        let labels = [("8AM", 4), ("9:30AM", 1), ("11AM", 0), ("12:30PM", 0), ("2PM", 1), ("3:30PM", 3)]
            .into_iter()
            .map(|(label, penalty)| (label.to_string(), penalty))
            .collect();
        Self {
            positions: vec![4, 1, 0, 0, 1, 3],
            labels,
        }
    }
}

impl TimePenaltyTable {
    /// Adds a label override.
    pub fn with_label(mut self, label: impl Into<String>, penalty: i64) -> Self {
        self.labels.insert(label.into(), penalty);
        self
    }

    /// Penalty of starting a class in the slot at `position` labelled `label`.
    pub fn penalty(&self, position: usize, label: &str) -> i64 {
        self.labels
            .get(label)
            .or_else(|| self.positions.get(position))
            .copied()
            .unwrap_or(0)
    }
}

/// Formulation of the consecutive-class penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsecutivePenalty {
    /// One point per back-to-back slot pair.
    #[default]
    PairCount,
    /// `n(n+1)/2` per professor with `n` back-to-back pairs.
    Triangular,
}

/// Relative weights of the three objective terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub time: i64,
    pub consecutive: i64,
    pub balance: i64,
}

impl ObjectiveWeights {
    /// Weighted total of already-computed term values.
    pub fn combine(&self, time: i64, consecutive: i64, balance: i64) -> i64 {
        self.time * time + self.consecutive * consecutive + self.balance * balance
    }
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            time: 1,
            consecutive: 1,
            balance: 1,
        }
    }
}

/// Everything the objective builder needs besides the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    pub weights: ObjectiveWeights,
    pub consecutive: ConsecutivePenalty,
    pub time_penalties: TimePenaltyTable,
}

/// Linear expressions of the three objective totals.
#[derive(Debug, Clone)]
pub struct ObjectiveTerms {
    pub time_penalty: Expression,
    pub consecutive_penalty: Expression,
    pub workload_balance: Expression,
}

impl ObjectiveTerms {
    /// `w_time·time + w_consec·consecutive + w_balance·balance`.
    pub fn weighted(&self, w: ObjectiveWeights) -> Expression {
        w.time as f64 * self.time_penalty.clone()
            + w.consecutive as f64 * self.consecutive_penalty.clone()
            + w.balance as f64 * self.workload_balance.clone()
    }
}

/// `n(n+1)/2`, zero for non-positive `n`.
pub(crate) fn triangular(n: i64) -> i64 {
    if n <= 0 {
        0
    } else {
        n * (n + 1) / 2
    }
}

/// Penalty of the slot a candidate's block starts in.
pub(crate) fn start_penalty(
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    candidate: &Candidate,
    table: &TimePenaltyTable,
) -> i64 {
    let block = domain.block_of(candidate);
    let label = snapshot
        .time_slot(block.start_slot())
        .map(|ts| ts.label.as_str())
        .unwrap_or_default();
    table.penalty(block.start, label)
}

/// Builds the objective totals over the candidate variables.
///
/// `x[i]` must be the decision variable of candidate `i`. Auxiliary
/// variables and their linking constraints are added to `f`.
pub(crate) fn build_objective(
    f: &mut Formulation,
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    x: &[Variable],
    config: &ObjectiveConfig,
) -> ObjectiveTerms {
    let time_penalty = domain
        .iter()
        .filter_map(|(idx, cand)| {
            let penalty = start_penalty(snapshot, domain, cand, &config.time_penalties);
            (penalty != 0).then(|| penalty as f64 * x[idx.0])
        })
        .sum();

    ObjectiveTerms {
        time_penalty,
        consecutive_penalty: consecutive_penalty(f, snapshot, domain, x, config.consecutive),
        workload_balance: workload_balance(f, snapshot, domain, x),
    }
}

fn consecutive_penalty(
    f: &mut Formulation,
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    x: &[Variable],
    formulation: ConsecutivePenalty,
) -> Expression {
    // (professor, slot) -> variables whose block covers the slot
    let mut touching: BTreeMap<(ProfessorId, TimeSlotId), Vec<Variable>> = BTreeMap::new();
    for (idx, cand) in domain.iter() {
        for &slot in &domain.block_of(cand).slots {
            touching
                .entry((cand.key.professor, slot))
                .or_default()
                .push(x[idx.0]);
        }
    }

    // y >= first + second - 1 with y in [0, 1]: minimization keeps y at 1
    // exactly when the professor teaches both slots.
    let mut per_professor: BTreeMap<ProfessorId, Vec<Variable>> = BTreeMap::new();
    for professor in snapshot.professors() {
        for pattern in DayPattern::ALL {
            for pair in snapshot.pattern_slots(pattern).windows(2) {
                let (Some(first), Some(second)) = (
                    touching.get(&(professor.id, pair[0])),
                    touching.get(&(professor.id, pair[1])),
                ) else {
                    continue;
                };
                let both: Expression = first.iter().chain(second).copied().sum::<Expression>() - 1.0;
                let y = f.nonnegative(Some(1.0));
                f.add(
                    format!("consecutive[{},{},{}]", professor.id, pair[0], pair[1]),
                    constraint!(y >= both),
                );
                per_professor.entry(professor.id).or_default().push(y);
            }
        }
    }

    let indicators = per_professor.values().map(Vec::len).sum::<usize>();
    debug!(indicators, ?formulation, "consecutive-class indicators built");

    match formulation {
        ConsecutivePenalty::PairCount => per_professor.into_values().flatten().sum(),
        ConsecutivePenalty::Triangular => {
            // With unit steps u_1..u_K covering the pair count, the cheapest
            // cover fills the low-cost steps first: cost 1 + 2 + .. + n.
            let mut totals = Vec::with_capacity(per_professor.len());
            for (professor, pairs) in per_professor {
                let steps: Vec<Variable> = pairs.iter().map(|_| f.nonnegative(Some(1.0))).collect();
                let covered: Expression = steps.iter().copied().sum();
                let used: Expression = pairs.into_iter().sum();
                f.add(format!("consecutive_steps[{professor}]"), constraint!(covered >= used));
                totals.extend(
                    steps
                        .into_iter()
                        .enumerate()
                        .map(|(k, u)| (k + 1) as f64 * u),
                );
            }
            totals.into_iter().sum()
        }
    }
}

fn workload_balance(
    f: &mut Formulation,
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    x: &[Variable],
) -> Expression {
    let mut load_terms: BTreeMap<ProfessorId, Vec<Expression>> = snapshot
        .professors()
        .map(|p| (p.id, Vec::new()))
        .collect();
    for (idx, cand) in domain.iter() {
        if let Some(terms) = load_terms.get_mut(&cand.key.professor) {
            terms.push(f64::from(cand.credit_hours) * x[idx.0]);
        }
    }

    if load_terms.is_empty() {
        return Expression::from(0.0);
    }

    let max_load = f.nonnegative(None);
    let min_load = f.nonnegative(None);
    for (professor, terms) in load_terms {
        let load: Expression = terms.into_iter().sum();
        let upper = load.clone();
        f.add(format!("max_load[{professor}]"), constraint!(max_load >= upper));
        f.add(format!("min_load[{professor}]"), constraint!(min_load <= load));
    }
    Expression::from(max_load) - min_load
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Professor, Room, Section, TimeSlot};
    use crate::snapshot::SnapshotData;
    use crate::solver::{MipSolver, SolveStatus, SolverConfig, TimetableSolver};
    use crate::timetable::TimetableMipBuilder;

    #[test]
    fn test_time_penalty_table() {
        let table = TimePenaltyTable::default();
        assert_eq!(table.penalty(0, "8AM"), 4);
        assert_eq!(table.penalty(2, "11AM"), 0);
        assert_eq!(table.penalty(5, "3:30PM"), 3);
        assert_eq!(table.penalty(9, "7PM"), 0);
        // Standard labels win over position.
        assert_eq!(table.penalty(0, "11AM"), 0);

        let table = table.with_label("7PM", 6);
        assert_eq!(table.penalty(9, "7PM"), 6);
        assert_eq!(table.penalty(0, "7PM"), 6);
    }

    #[test]
    fn test_objective_config_from_toml() {
        let cfg: ObjectiveConfig = toml::from_str(
            r#"
consecutive = "triangular"

[weights]
balance = 3

[time_penalties.labels]
"8AM" = 10
"#,
        )
        .unwrap();
        assert_eq!(cfg.consecutive, ConsecutivePenalty::Triangular);
        assert_eq!(cfg.weights.balance, 3);
        assert_eq!(cfg.weights.time, 1);
        assert_eq!(cfg.time_penalties.positions, vec![4, 1, 0, 0, 1, 3]);
        assert_eq!(cfg.time_penalties.penalty(3, "8AM"), 10);
    }

    /// One professor teaching three single-slot sections over three MWF slots.
    fn full_day() -> Snapshot {
        let mut data = SnapshotData::new()
            .with_course(Course::new(1, "Math", 3, DayPattern::Mwf).with_max_students(10))
            .with_professor(Professor::new(1, "Dr. A", 12))
            .with_room(Room::new(1, "R1", 20))
            .with_time_slot(TimeSlot::new(1, "8AM", DayPattern::Mwf))
            .with_time_slot(TimeSlot::new(2, "9:30AM", DayPattern::Mwf))
            .with_time_slot(TimeSlot::new(3, "11AM", DayPattern::Mwf))
            .with_eligibility(1, 1);
        for s in 1..=3 {
            data = data.with_section(Section::new(s, 1, s));
        }
        Snapshot::from_data(data).unwrap()
    }

    /// Solves to optimality and returns the objective value.
    fn solve_objective(snapshot: &Snapshot, config: ObjectiveConfig) -> f64 {
        let domain = CandidateDomain::build(snapshot).unwrap();
        let model = TimetableMipBuilder::new(snapshot, &domain)
            .with_objective(config)
            .build(&SolverConfig::default())
            .unwrap();
        let sol = MipSolver::new().solve(model, &SolverConfig::default());
        assert_eq!(sol.status, SolveStatus::Optimal);
        sol.objective.unwrap()
    }

    fn weights(time: i64, consecutive: i64, balance: i64) -> ObjectiveWeights {
        ObjectiveWeights {
            time,
            consecutive,
            balance,
        }
    }

    #[test]
    fn test_triangular_numbers() {
        assert_eq!(triangular(-1), 0);
        assert_eq!(triangular(0), 0);
        assert_eq!(triangular(1), 1);
        assert_eq!(triangular(4), 10);
    }

    #[test]
    fn test_pair_count_penalty() {
        let snap = full_day();
        // Every slot is taken: 8AM costs 4 and 9:30AM costs 1.
        let time = solve_objective(&snap, ObjectiveConfig {
            weights: weights(1, 0, 0),
            ..ObjectiveConfig::default()
        });
        assert!((time - 5.0).abs() < 1e-6);

        // Both adjacent pairs are used.
        let consecutive = solve_objective(&snap, ObjectiveConfig {
            weights: weights(0, 1, 0),
            ..ObjectiveConfig::default()
        });
        assert!((consecutive - 2.0).abs() < 1e-6);

        let balance = solve_objective(&snap, ObjectiveConfig {
            weights: weights(0, 0, 1),
            ..ObjectiveConfig::default()
        });
        assert!(balance.abs() < 1e-6);
    }

    #[test]
    fn test_triangular_penalty() {
        let snap = full_day();
        let consecutive = solve_objective(&snap, ObjectiveConfig {
            weights: weights(0, 1, 0),
            consecutive: ConsecutivePenalty::Triangular,
            ..ObjectiveConfig::default()
        });
        assert!((consecutive - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_balance_spreads_load() {
        // Two interchangeable professors, two sections, distinct slots.
        let data = SnapshotData::new()
            .with_course(Course::new(1, "Math", 3, DayPattern::Mwf).with_max_students(10))
            .with_professor(Professor::new(1, "Dr. A", 12))
            .with_professor(Professor::new(2, "Dr. B", 12))
            .with_room(Room::new(1, "R1", 20))
            .with_time_slot(TimeSlot::new(1, "11AM", DayPattern::Mwf))
            .with_time_slot(TimeSlot::new(2, "12:30PM", DayPattern::Mwf))
            .with_section(Section::new(1, 1, 1))
            .with_section(Section::new(2, 1, 2))
            .with_eligibility(1, 1)
            .with_eligibility(1, 2);
        let snap = Snapshot::from_data(data).unwrap();
        let total = solve_objective(&snap, ObjectiveConfig::default());
        assert!(total.abs() < 1e-6);
    }
}
