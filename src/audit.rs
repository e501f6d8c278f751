//! Independent hard-constraint audit of a produced schedule.
//!
//! Re-checks every hard rule directly on the records, without looking at
//! the model that produced them.

use std::collections::BTreeMap;

use crate::domain::enumerate_blocks;
use crate::models::{ProfessorId, RoomId, Schedule, SectionId, TimeSlotId, Violation, ViolationType};
use crate::snapshot::Snapshot;

/// Returns every hard-constraint violation in `schedule`.
///
/// An empty result means the schedule is acceptable.
pub fn audit_schedule(snapshot: &Snapshot, schedule: &Schedule) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut seen: BTreeMap<SectionId, usize> = BTreeMap::new();
    for r in &schedule.records {
        *seen.entry(r.section_id).or_insert(0) += 1;
    }
    for section in snapshot.sections() {
        match seen.get(&section.id).copied().unwrap_or(0) {
            0 => violations.push(Violation::new(
                ViolationType::MissingSection,
                format!("{} has no assignment", section.id),
            )),
            1 => {}
            n => violations.push(Violation::new(
                ViolationType::DuplicateSection,
                format!("{} is assigned {n} times", section.id),
            )),
        }
    }

    let mut room_use: BTreeMap<(RoomId, TimeSlotId), Vec<SectionId>> = BTreeMap::new();
    let mut professor_use: BTreeMap<(ProfessorId, TimeSlotId), Vec<SectionId>> = BTreeMap::new();
    let mut load: BTreeMap<ProfessorId, u32> = BTreeMap::new();

    for r in &schedule.records {
        let (Some(section), Some(course), Some(professor), Some(room)) = (
            snapshot.section(r.section_id),
            snapshot.course(r.course_id),
            snapshot.professor(r.professor_id),
            snapshot.room(r.room_id),
        ) else {
            violations.push(Violation::new(
                ViolationType::UnknownReference,
                format!("record for {} references an unknown entity", r.section_id),
            ));
            continue;
        };
        if section.course_id != course.id {
            violations.push(Violation::new(
                ViolationType::UnknownReference,
                format!("{} does not belong to {}", section.id, course.id),
            ));
        }

        if !snapshot.is_eligible(course.id, professor.id) {
            violations.push(Violation::new(
                ViolationType::IneligibleProfessor,
                format!("{} may not teach '{}'", professor.name, course.name),
            ));
        }
        if !snapshot.room_eligibility(course.id).permits(room.id) {
            violations.push(Violation::new(
                ViolationType::RoomNotPermitted,
                format!("'{}' may not use {}", course.name, room.name),
            ));
        }
        if !room.seats(course.max_students) {
            violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                format!(
                    "'{}' enrolls {} but {} seats {}",
                    course.name, course.max_students, room.name, room.capacity
                ),
            ));
        }

        let valid_block = r.day_pattern == course.day_pattern
            && enumerate_blocks(
                course.day_pattern,
                snapshot.pattern_slots(course.day_pattern),
                course.slots_needed as usize,
            )
            .iter()
            .any(|b| b.slots == r.slot_ids);
        if !valid_block {
            violations.push(Violation::new(
                ViolationType::InvalidBlock,
                format!(
                    "{} occupies {:?}, not {} contiguous {} slots",
                    section.id, r.slot_ids, course.slots_needed, course.day_pattern
                ),
            ));
        }

        for &slot in &r.slot_ids {
            if snapshot.is_restricted(professor.id, slot) {
                violations.push(Violation::new(
                    ViolationType::RestrictedSlot,
                    format!("{} is unavailable at {slot}", professor.name),
                ));
            }
            room_use.entry((room.id, slot)).or_default().push(section.id);
            professor_use.entry((professor.id, slot)).or_default().push(section.id);
        }
        *load.entry(professor.id).or_insert(0) += course.credit_hours;
    }

    for ((room, slot), sections) in room_use {
        if sections.len() > 1 {
            violations.push(Violation::new(
                ViolationType::RoomConflict,
                format!("{room} hosts {} sections at {slot}", sections.len()),
            ));
        }
    }
    for ((professor, slot), sections) in professor_use {
        if sections.len() > 1 {
            violations.push(Violation::new(
                ViolationType::ProfessorConflict,
                format!("{professor} teaches {} sections at {slot}", sections.len()),
            ));
        }
    }
    for (professor_id, hours) in load {
        if let Some(p) = snapshot.professor(professor_id) {
            if hours > p.max_credit_hours {
                violations.push(Violation::new(
                    ViolationType::WorkloadExceeded,
                    format!("{} teaches {hours} credit hours (max {})", p.name, p.max_credit_hours),
                ));
            }
        }
    }

    violations
}
