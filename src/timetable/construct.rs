//! Constructive incumbent.
//!
//! Places sections greedily, most constrained first, each into the cheapest
//! candidate whose room and professor are free over the whole block and
//! whose professor has credit hours left. Restarts shuffle the placement
//! order. The result satisfies every hard constraint but carries no
//! optimality claim.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::domain::{CandidateDomain, CandidateIndex};
use crate::models::{ProfessorId, RoomId, SectionId, TimeSlotId};
use crate::snapshot::Snapshot;
use crate::solver::SolverConfig;

use super::objective::{start_penalty, ObjectiveConfig};

/// Runs the greedy pass, retrying `config.restarts` shuffled orders.
///
/// Returns the selected candidates in ascending order, or `None` when no
/// attempt placed every section.
pub fn construct_incumbent(
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    objective: &ObjectiveConfig,
    config: &SolverConfig,
) -> Option<Vec<CandidateIndex>> {
    let mut sections: Vec<(SectionId, Vec<CandidateIndex>)> = domain
        .sections()
        .map(|(section, candidates)| {
            let open = candidates
                .filter(|&i| {
                    let cand = domain.get(i);
                    !domain
                        .block_of(cand)
                        .slots
                        .iter()
                        .any(|&slot| snapshot.is_restricted(cand.key.professor, slot))
                })
                .collect();
            (section, open)
        })
        .collect();
    sections.sort_by_key(|(section, open)| (open.len(), *section));

    let cost: Vec<i64> = domain
        .iter()
        .map(|(_, cand)| {
            objective.weights.time * start_penalty(snapshot, domain, cand, &objective.time_penalties)
        })
        .collect();

    let mut order: Vec<usize> = (0..sections.len()).collect();
    for attempt in 0..=config.restarts {
        if attempt > 0 {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(u64::from(attempt)));
            order.shuffle(&mut rng);
        }
        if let Some(selected) = place(snapshot, domain, &sections, &order, &cost) {
            debug!(attempt, sections = selected.len(), "incumbent constructed");
            return Some(selected);
        }
    }
    debug!(attempts = config.restarts.saturating_add(1), "no incumbent constructed");
    None
}

fn place(
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    sections: &[(SectionId, Vec<CandidateIndex>)],
    order: &[usize],
    cost: &[i64],
) -> Option<Vec<CandidateIndex>> {
    let mut rooms: BTreeSet<(RoomId, TimeSlotId)> = BTreeSet::new();
    let mut professors: BTreeSet<(ProfessorId, TimeSlotId)> = BTreeSet::new();
    let mut load: BTreeMap<ProfessorId, u32> = BTreeMap::new();
    let mut selected = Vec::with_capacity(sections.len());

    for &s in order {
        let (_, open) = &sections[s];
        let best = open
            .iter()
            .copied()
            .filter(|&i| {
                let cand = domain.get(i);
                let cap = snapshot
                    .professor(cand.key.professor)
                    .map_or(0, |p| p.max_credit_hours);
                let taught = load.get(&cand.key.professor).copied().unwrap_or(0);
                taught + cand.credit_hours <= cap
                    && domain.block_of(cand).slots.iter().all(|&slot| {
                        !rooms.contains(&(cand.key.room, slot))
                            && !professors.contains(&(cand.key.professor, slot))
                    })
            })
            .min_by_key(|&i| {
                let professor = domain.get(i).key.professor;
                (cost[i.0], load.get(&professor).copied().unwrap_or(0), i)
            })?;

        let cand = domain.get(best);
        for &slot in &domain.block_of(cand).slots {
            rooms.insert((cand.key.room, slot));
            professors.insert((cand.key.professor, slot));
        }
        *load.entry(cand.key.professor).or_default() += cand.credit_hours;
        selected.push(best);
    }

    selected.sort();
    Some(selected)
}
