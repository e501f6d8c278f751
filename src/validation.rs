//! Input validation for timetabling snapshots.
//!
//! Checks structural integrity of the repository snapshot before any
//! candidate is generated. Detects:
//! - Duplicate IDs
//! - Dangling references in sections and link tables
//! - Zero or empty values where a positive value is required
//! - Duplicate section numbers within a course
//! - Courses whose block length exceeds their day pattern
//! - Courses with sections but nobody eligible to teach them
//!
//! Every problem is collected; validation never stops at the first one.

use std::collections::{BTreeMap, HashSet};

use crate::models::{CourseId, DayPattern};
use crate::snapshot::SnapshotData;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of one kind share the same ID.
    DuplicateId,
    /// A section or link references an entity that doesn't exist.
    DanglingReference,
    /// A field holds a value outside its valid range.
    InvalidValue,
    /// Two sections of one course share a section number.
    DuplicateSectionNumber,
    /// A course needs more contiguous slots than its pattern defines.
    BlockExceedsPattern,
    /// A course has sections but no eligible professor.
    NoEligibleProfessor,
    /// A section has no admissible (professor, block, room) candidate.
    NoFeasibleCandidate,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a repository snapshot.
///
/// Checks:
/// 1. No duplicate course, professor, room, slot or section IDs
/// 2. Positive credit hours, enrollment caps, slot counts and capacities
/// 3. Every section references an existing course
/// 4. Section numbers are unique within a course
/// 5. Every link references existing entities
/// 6. For each course with sections: the pattern has at least
///    `slots_needed` slots and at least one professor is eligible
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_snapshot(data: &SnapshotData) -> ValidationResult {
    let mut errors = Vec::new();

    let mut course_ids = HashSet::new();
    for c in &data.courses {
        if !course_ids.insert(c.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", c.id.get()),
            ));
        }
        if c.name.trim().is_empty() {
            errors.push(invalid(format!("Course {} has an empty name", c.id.get())));
        }
        if c.credit_hours == 0 {
            errors.push(invalid(format!("Course '{}' has zero credit hours", c.name)));
        }
        if c.max_students == 0 {
            errors.push(invalid(format!("Course '{}' has zero max students", c.name)));
        }
        if c.slots_needed == 0 {
            errors.push(invalid(format!("Course '{}' needs zero slots", c.name)));
        }
    }

    let mut professor_ids = HashSet::new();
    for p in &data.professors {
        if !professor_ids.insert(p.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate professor ID: {}", p.id.get()),
            ));
        }
        if p.name.trim().is_empty() {
            errors.push(invalid(format!("Professor {} has an empty name", p.id.get())));
        }
    }

    let mut room_ids = HashSet::new();
    for r in &data.rooms {
        if !room_ids.insert(r.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id.get()),
            ));
        }
        if r.capacity == 0 {
            errors.push(invalid(format!("Room '{}' has zero capacity", r.name)));
        }
    }

    let mut slot_ids = HashSet::new();
    let mut pattern_lengths: BTreeMap<DayPattern, usize> = BTreeMap::new();
    for ts in &data.time_slots {
        if !slot_ids.insert(ts.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate time slot ID: {}", ts.id.get()),
            ));
            continue;
        }
        *pattern_lengths.entry(ts.day_pattern).or_insert(0) += 1;
    }

    let mut section_ids = HashSet::new();
    let mut section_numbers = HashSet::new();
    let mut sectioned_courses: BTreeMap<CourseId, Vec<u32>> = BTreeMap::new();
    for s in &data.sections {
        if !section_ids.insert(s.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate section ID: {}", s.id.get()),
            ));
            continue;
        }
        if !course_ids.contains(&s.course_id) {
            errors.push(dangling(format!(
                "Section {} references unknown course {}",
                s.id.get(),
                s.course_id.get()
            )));
            continue;
        }
        if !section_numbers.insert((s.course_id, s.section_number)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSectionNumber,
                format!(
                    "Course {} has more than one section numbered {}",
                    s.course_id.get(),
                    s.section_number
                ),
            ));
        }
        sectioned_courses.entry(s.course_id).or_default().push(s.id.get());
    }

    // Link tables
    let mut staffed_courses = HashSet::new();
    for link in &data.course_professors {
        let course_ok = course_ids.contains(&link.course_id);
        let professor_ok = professor_ids.contains(&link.professor_id);
        if !course_ok {
            errors.push(dangling(format!(
                "Eligibility link references unknown course {}",
                link.course_id.get()
            )));
        }
        if !professor_ok {
            errors.push(dangling(format!(
                "Eligibility link references unknown professor {}",
                link.professor_id.get()
            )));
        }
        if course_ok && professor_ok {
            staffed_courses.insert(link.course_id);
        }
    }

    for link in &data.room_restrictions {
        if !course_ids.contains(&link.course_id) {
            errors.push(dangling(format!(
                "Room restriction references unknown course {}",
                link.course_id.get()
            )));
        }
        if !room_ids.contains(&link.room_id) {
            errors.push(dangling(format!(
                "Room restriction references unknown room {}",
                link.room_id.get()
            )));
        }
    }

    for link in &data.professor_restrictions {
        if !professor_ids.contains(&link.professor_id) {
            errors.push(dangling(format!(
                "Professor restriction references unknown professor {}",
                link.professor_id.get()
            )));
        }
        if !slot_ids.contains(&link.time_slot_id) {
            errors.push(dangling(format!(
                "Professor restriction references unknown time slot {}",
                link.time_slot_id.get()
            )));
        }
    }

    // Per-course structural feasibility (only courses that must be placed)
    for c in &data.courses {
        let Some(sections) = sectioned_courses.get(&c.id) else {
            continue;
        };
        let available = pattern_lengths.get(&c.day_pattern).copied().unwrap_or(0);
        if c.slots_needed as usize > available {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlockExceedsPattern,
                format!(
                    "Course '{}' needs {} contiguous {} slots but only {} exist",
                    c.name, c.slots_needed, c.day_pattern, available
                ),
            ));
        }
        if !staffed_courses.contains(&c.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoEligibleProfessor,
                format!(
                    "Course '{}' has no eligible professor for sections {:?}",
                    c.name, sections
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid(message: String) -> ValidationError {
    ValidationError::new(ValidationErrorKind::InvalidValue, message)
}

fn dangling(message: String) -> ValidationError {
    ValidationError::new(ValidationErrorKind::DanglingReference, message)
}
