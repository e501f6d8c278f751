//! Candidate domain generation.
//!
//! Enumerates, per section, every (professor, block, room) combination that
//! passes the static filters: teaching eligibility, room restriction and
//! room capacity. Rejected combinations are never materialized.

use std::ops::Range;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{CourseId, DayPattern, ProfessorId, RoomId, SectionId, TimeSlotId};
use crate::snapshot::Snapshot;
use crate::validation::{ValidationError, ValidationErrorKind};

/// A contiguous run of slots within one day pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub day_pattern: DayPattern,
    /// Position of the first slot within the pattern.
    pub start: usize,
    /// Occupied slots in chronological order.
    pub slots: Vec<TimeSlotId>,
}

impl Block {
    /// First slot of the block.
    pub fn start_slot(&self) -> TimeSlotId {
        self.slots[0]
    }

    /// Whether the block covers `slot`.
    pub fn contains(&self, slot: TimeSlotId) -> bool {
        self.slots.contains(&slot)
    }
}

/// Every contiguous window of `len` slots over `ordered`.
///
/// Returns nothing when `len` is zero or exceeds the number of slots.
pub fn enumerate_blocks(day_pattern: DayPattern, ordered: &[TimeSlotId], len: usize) -> Vec<Block> {
    if len == 0 || len > ordered.len() {
        return Vec::new();
    }
    ordered
        .windows(len)
        .enumerate()
        .map(|(start, window)| Block {
            day_pattern,
            start,
            slots: window.to_vec(),
        })
        .collect()
}

/// Structured identity of a candidate assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateKey {
    pub section: SectionId,
    pub professor: ProfessorId,
    pub day_pattern: DayPattern,
    /// Block start position within the pattern.
    pub block_start: usize,
    pub room: RoomId,
}

/// Index of a candidate in its [`CandidateDomain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateIndex(pub usize);

/// Candidate indices of one section.
pub type IndexIter = std::iter::Map<Range<usize>, fn(usize) -> CandidateIndex>;

/// A statically feasible assignment of one section.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub key: CandidateKey,
    pub course: CourseId,
    pub credit_hours: u32,
    /// Index into the domain's block table for this candidate's course.
    block: usize,
}

/// All candidates of one solve, grouped by section.
#[derive(Debug, Clone, Default)]
pub struct CandidateDomain {
    candidates: Vec<Candidate>,
    blocks: Vec<Block>,
    by_section: Vec<(SectionId, Range<usize>)>,
}

impl CandidateDomain {
    /// Builds the candidate domain for every section in the snapshot.
    ///
    /// Fails with [`EngineError::DataIntegrity`] listing each section that
    /// ends up with no candidate at all.
    pub fn build(snapshot: &Snapshot) -> EngineResult<Self> {
        let mut domain = Self::default();
        let mut empty = Vec::new();

        for course in snapshot.courses() {
            let sections = snapshot.sections_of(course.id);
            if sections.is_empty() {
                continue;
            }

            let block_base = domain.blocks.len();
            domain.blocks.extend(enumerate_blocks(
                course.day_pattern,
                snapshot.pattern_slots(course.day_pattern),
                course.slots_needed as usize,
            ));
            let block_range = block_base..domain.blocks.len();

            let permitted = snapshot.room_eligibility(course.id);
            let rooms: Vec<RoomId> = snapshot
                .rooms()
                .filter(|r| permitted.permits(r.id) && r.seats(course.max_students))
                .map(|r| r.id)
                .collect();

            for &section in sections {
                let start = domain.candidates.len();
                for professor in snapshot.eligible_professors(course.id) {
                    for b in block_range.clone() {
                        for &room in &rooms {
                            domain.candidates.push(Candidate {
                                key: CandidateKey {
                                    section,
                                    professor,
                                    day_pattern: course.day_pattern,
                                    block_start: domain.blocks[b].start,
                                    room,
                                },
                                course: course.id,
                                credit_hours: course.credit_hours,
                                block: b,
                            });
                        }
                    }
                }
                let end = domain.candidates.len();
                if start == end {
                    empty.push(ValidationError::new(
                        ValidationErrorKind::NoFeasibleCandidate,
                        format!(
                            "Section {} of '{}' has no feasible (professor, block, room) candidate",
                            section.get(),
                            course.name
                        ),
                    ));
                }
                domain.by_section.push((section, start..end));
            }
        }

        if !empty.is_empty() {
            return Err(EngineError::DataIntegrity(empty));
        }

        domain.by_section.sort_by_key(|(s, _)| *s);
        debug!(
            sections = domain.by_section.len(),
            candidates = domain.candidates.len(),
            blocks = domain.blocks.len(),
            "candidate domain built"
        );
        Ok(domain)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: CandidateIndex) -> &Candidate {
        &self.candidates[index.0]
    }

    /// Block occupied by a candidate.
    pub fn block_of(&self, candidate: &Candidate) -> &Block {
        &self.blocks[candidate.block]
    }

    /// All candidates with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (CandidateIndex, &Candidate)> {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (CandidateIndex(i), c))
    }

    /// Sections with their candidate indices, ascending by section id.
    pub fn sections(&self) -> impl Iterator<Item = (SectionId, IndexIter)> + '_ {
        self.by_section.iter().map(|(s, range)| {
            (*s, range.clone().map(CandidateIndex as fn(usize) -> CandidateIndex))
        })
    }

    /// Candidates of one section.
    pub fn candidates_of(&self, section: SectionId) -> impl Iterator<Item = CandidateIndex> + '_ {
        self.by_section
            .binary_search_by_key(&section, |(s, _)| *s)
            .ok()
            .map(|i| self.by_section[i].1.clone())
            .unwrap_or(0..0)
            .map(CandidateIndex)
    }
}
