//! Schedule (solution) model.
//!
//! A schedule is the resolved assignment of every section to a professor,
//! a room and a block of time slots, with display fields denormalized so the
//! presentation layer never needs to re-query the repository.

use serde::{Deserialize, Serialize};

use super::{CourseId, DayPattern, ProfessorId, RoomId, SectionId, TimeSlotId};

/// A complete timetable for one term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// One record per section.
    pub records: Vec<ScheduleRecord>,
}

/// A section's resolved assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// Assigned section.
    pub section_id: SectionId,
    /// Section number within its course.
    pub section_number: u32,
    /// Owning course.
    pub course_id: CourseId,
    /// Course display name.
    pub course_name: String,
    /// Credit hours of the course (counted toward the professor's load).
    pub credit_hours: u32,
    /// Assigned professor.
    pub professor_id: ProfessorId,
    /// Professor display name.
    pub professor_name: String,
    /// Assigned room.
    pub room_id: RoomId,
    /// Room display name.
    pub room_name: String,
    /// Meeting pattern.
    pub day_pattern: DayPattern,
    /// Label of the first slot in the block.
    pub start_time: String,
    /// Slots occupied, in chronological order.
    pub slot_ids: Vec<TimeSlotId>,
    /// Labels of the occupied slots, parallel to `slot_ids`.
    pub slot_labels: Vec<String>,
}

/// Objective component values of a solved schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Sum of start-slot time-of-day penalties.
    pub time_penalty: i64,
    /// Consecutive-class penalty under the configured formulation.
    pub consecutive_penalty: i64,
    /// Max minus min professor workload (credit hours).
    pub workload_balance: i64,
}

/// A hard-constraint violation found in a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Human-readable description.
    pub message: String,
}

/// Classification of hard-constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A section has no record.
    MissingSection,
    /// A section has more than one record.
    DuplicateSection,
    /// A record references an entity missing from the snapshot.
    UnknownReference,
    /// Two records occupy one room in one slot.
    RoomConflict,
    /// Two records occupy one professor in one slot.
    ProfessorConflict,
    /// Professor assigned more credit hours than allowed.
    WorkloadExceeded,
    /// Course enrollment exceeds room capacity.
    CapacityExceeded,
    /// Record touches a slot the professor is unavailable for.
    RestrictedSlot,
    /// Block is not a contiguous run of the right length in the right pattern.
    InvalidBlock,
    /// Professor is not eligible to teach the course.
    IneligibleProfessor,
    /// Room is not permitted for the course.
    RoomNotPermitted,
}

impl ScheduleRecord {
    /// Whether this record occupies `slot`.
    #[inline]
    pub fn occupies(&self, slot: TimeSlotId) -> bool {
        self.slot_ids.contains(&slot)
    }

    /// Canonical sort key: pattern, chronological start, section id.
    fn sort_key(&self) -> (DayPattern, Option<TimeSlotId>, SectionId) {
        (self.day_pattern, self.slot_ids.first().copied(), self.section_id)
    }
}

impl Violation {
    /// Creates a new violation.
    pub fn new(violation_type: ViolationType, message: impl Into<String>) -> Self {
        Self {
            violation_type,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    pub fn add_record(&mut self, record: ScheduleRecord) {
        self.records.push(record);
    }

    /// Sorts records by (day pattern, start slot, section id).
    pub fn sort_canonical(&mut self) {
        self.records.sort_by_key(|r| r.sort_key());
    }

    /// Finds the record for a section.
    pub fn record_for_section(&self, section_id: SectionId) -> Option<&ScheduleRecord> {
        self.records.iter().find(|r| r.section_id == section_id)
    }

    /// Returns all records taught by a professor.
    pub fn records_for_professor(&self, professor_id: ProfessorId) -> Vec<&ScheduleRecord> {
        self.records
            .iter()
            .filter(|r| r.professor_id == professor_id)
            .collect()
    }

    /// Returns all records hosted in a room.
    pub fn records_for_room(&self, room_id: RoomId) -> Vec<&ScheduleRecord> {
        self.records.iter().filter(|r| r.room_id == room_id).collect()
    }

    /// Credit hours assigned to a professor.
    pub fn professor_load(&self, professor_id: ProfessorId) -> u32 {
        self.records_for_professor(professor_id)
            .iter()
            .map(|r| r.credit_hours)
            .sum()
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Whether the schedule has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
