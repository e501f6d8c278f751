//! Timetable MIP formulation.
//!
//! Translates a snapshot and its candidate domain into a [`TimetableModel`]:
//! one binary per candidate, the hard constraints, the objective, and a
//! constructed incumbent for the solver to fall back on.
//!
//! # Reference
//! - Schaerf (1999), "A Survey of Automated Timetabling"

use std::collections::BTreeMap;

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use thiserror::Error;
use tracing::debug;

use crate::domain::{CandidateDomain, CandidateIndex};
use crate::models::{ProfessorId, RoomId, TimeSlotId};
use crate::snapshot::Snapshot;
use crate::solver::{Solution, SolverConfig, TimetableSolver};

use super::construct::construct_incumbent;
use super::objective::{build_objective, ObjectiveConfig, ObjectiveTerms};

/// Model construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("objective weight '{term}' must be non-negative, got {weight}")]
    NegativeWeight { term: &'static str, weight: i64 },
}

/// Variables and named constraints of a model under construction.
pub(crate) struct Formulation {
    pub(crate) vars: ProblemVariables,
    pub(crate) constraints: Vec<(String, Constraint)>,
    variables: usize,
}

impl Formulation {
    pub(crate) fn new() -> Self {
        Self {
            vars: ProblemVariables::new(),
            constraints: Vec::new(),
            variables: 0,
        }
    }

    pub(crate) fn binary(&mut self) -> Variable {
        self.variables += 1;
        self.vars.add(variable().binary())
    }

    /// Continuous variable in `[0, upper]`, or `[0, ∞)` without an upper bound.
    pub(crate) fn nonnegative(&mut self, upper: Option<f64>) -> Variable {
        self.variables += 1;
        let def = variable().min(0.0);
        let def = match upper {
            Some(u) => def.max(u),
            None => def,
        };
        self.vars.add(def)
    }

    pub(crate) fn add(&mut self, name: impl Into<String>, constraint: Constraint) {
        self.constraints.push((name.into(), constraint));
    }
}

/// A built model together with its mapping back to candidates.
pub struct TimetableModel {
    pub(crate) formulation: Formulation,
    /// `x[i]` is the decision variable of candidate `i`.
    pub(crate) x: Vec<Variable>,
    pub(crate) objective: Expression,
    pub(crate) terms: ObjectiveTerms,
    pub(crate) incumbent: Option<Vec<CandidateIndex>>,
    pub(crate) restricted: Vec<CandidateIndex>,
}

impl TimetableModel {
    /// Decision variable of a candidate.
    pub fn var(&self, candidate: CandidateIndex) -> Variable {
        self.x[candidate.0]
    }

    pub fn candidate_count(&self) -> usize {
        self.x.len()
    }

    /// Decision variables plus objective auxiliaries.
    pub fn variable_count(&self) -> usize {
        self.formulation.variables
    }

    pub fn constraint_count(&self) -> usize {
        self.formulation.constraints.len()
    }

    /// Constraint names in emission order.
    pub fn constraint_names(&self) -> impl Iterator<Item = &str> {
        self.formulation.constraints.iter().map(|(name, _)| name.as_str())
    }

    /// Objective total expressions.
    pub fn terms(&self) -> &ObjectiveTerms {
        &self.terms
    }

    /// Assignment found by the constructive pass, if any.
    pub fn incumbent(&self) -> Option<&[CandidateIndex]> {
        self.incumbent.as_deref()
    }

    /// Candidates forced to zero by a professor restriction.
    pub fn restricted(&self) -> &[CandidateIndex] {
        &self.restricted
    }
}

/// Builds the timetable model from domain objects.
///
/// # Example
/// ```no_run
/// use u_timetable::domain::CandidateDomain;
/// use u_timetable::snapshot::{Snapshot, SnapshotData};
/// use u_timetable::solver::{MipSolver, SolverConfig};
/// use u_timetable::timetable::TimetableMipBuilder;
///
/// let snapshot = Snapshot::load(&SnapshotData::new()).unwrap();
/// let domain = CandidateDomain::build(&snapshot).unwrap();
/// let solution = TimetableMipBuilder::new(&snapshot, &domain)
///     .solve(&MipSolver::new(), &SolverConfig::default())
///     .unwrap();
/// ```
pub struct TimetableMipBuilder<'a> {
    snapshot: &'a Snapshot,
    domain: &'a CandidateDomain,
    objective: ObjectiveConfig,
}

impl<'a> TimetableMipBuilder<'a> {
    /// Creates a builder with the default objective.
    pub fn new(snapshot: &'a Snapshot, domain: &'a CandidateDomain) -> Self {
        Self {
            snapshot,
            domain,
            objective: ObjectiveConfig::default(),
        }
    }

    /// Sets the objective configuration.
    pub fn with_objective(mut self, objective: ObjectiveConfig) -> Self {
        self.objective = objective;
        self
    }

    /// Builds the model.
    ///
    /// Creates:
    /// - A binary per candidate
    /// - Exactly-one per section
    /// - At-most-one per (room, slot) and per (professor, slot), counting
    ///   every slot a block covers
    /// - Zero for candidates touching a restricted slot
    /// - Credit-hour caps per professor
    /// - The weighted soft-penalty objective
    ///
    /// Exclusivity groups with a single member and caps no assignment can
    /// exceed are skipped. `config` drives the constructive pass.
    pub fn build(&self, config: &SolverConfig) -> Result<TimetableModel, ModelError> {
        let w = self.objective.weights;
        for (term, weight) in [("time", w.time), ("consecutive", w.consecutive), ("balance", w.balance)] {
            if weight < 0 {
                return Err(ModelError::NegativeWeight { term, weight });
            }
        }

        let mut f = Formulation::new();
        let x: Vec<Variable> = self.domain.iter().map(|_| f.binary()).collect();

        // Completeness
        for (section, candidates) in self.domain.sections() {
            let placed: Expression = candidates.map(|i| x[i.0]).sum();
            f.add(format!("section[{section}]"), constraint!(placed == 1));
        }

        // Exclusivity over every covered slot
        let mut room_use: BTreeMap<(RoomId, TimeSlotId), Vec<Variable>> = BTreeMap::new();
        let mut professor_use: BTreeMap<(ProfessorId, TimeSlotId), Vec<Variable>> = BTreeMap::new();
        let mut restricted = Vec::new();
        for (idx, cand) in self.domain.iter() {
            let var = x[idx.0];
            let block = self.domain.block_of(cand);
            for &slot in &block.slots {
                room_use.entry((cand.key.room, slot)).or_default().push(var);
                professor_use
                    .entry((cand.key.professor, slot))
                    .or_default()
                    .push(var);
            }
            if let Some(&slot) = block
                .slots
                .iter()
                .find(|&&slot| self.snapshot.is_restricted(cand.key.professor, slot))
            {
                f.add(
                    format!("restricted[{}@{slot}]", cand.key.professor),
                    constraint!(var <= 0),
                );
                restricted.push(idx);
            }
        }
        for ((room, slot), group) in room_use {
            if group.len() > 1 {
                let used: Expression = group.into_iter().sum();
                f.add(format!("room[{room}@{slot}]"), constraint!(used <= 1));
            }
        }
        for ((professor, slot), group) in professor_use {
            if group.len() > 1 {
                let busy: Expression = group.into_iter().sum();
                f.add(format!("professor[{professor}@{slot}]"), constraint!(busy <= 1));
            }
        }

        // Workload caps
        let mut load: BTreeMap<ProfessorId, Vec<(Variable, u32)>> = BTreeMap::new();
        for (idx, cand) in self.domain.iter() {
            load.entry(cand.key.professor)
                .or_default()
                .push((x[idx.0], cand.credit_hours));
        }
        for (professor_id, terms) in load {
            let Some(professor) = self.snapshot.professor(professor_id) else {
                continue;
            };
            let most: u32 = terms.iter().map(|(_, c)| c).sum();
            if most > professor.max_credit_hours {
                let cap = f64::from(professor.max_credit_hours);
                let taught: Expression = terms.into_iter().map(|(v, c)| f64::from(c) * v).sum();
                f.add(format!("workload[{professor_id}]"), constraint!(taught <= cap));
            }
        }

        let terms = build_objective(&mut f, self.snapshot, self.domain, &x, &self.objective);
        let objective = terms.weighted(w);
        let incumbent = construct_incumbent(self.snapshot, self.domain, &self.objective, config);

        debug!(
            candidates = x.len(),
            variables = f.variables,
            constraints = f.constraints.len(),
            restricted = restricted.len(),
            incumbent = incumbent.is_some(),
            "timetable model built"
        );

        Ok(TimetableModel {
            formulation: f,
            x,
            objective,
            terms,
            incumbent,
            restricted,
        })
    }

    /// Builds and solves the model.
    pub fn solve<S: TimetableSolver>(&self, solver: &S, config: &SolverConfig) -> Result<Solution, ModelError> {
        Ok(solver.solve(self.build(config)?, config))
    }
}
