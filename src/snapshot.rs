//! Repository snapshot loading.
//!
//! The engine reads every entity and relationship once, validates the lot,
//! and works from immutable indexed collections afterwards. All lookup maps
//! are ordered so that every downstream iteration is deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Course, CourseId, CourseProfessor, DayPattern, Professor, ProfessorId, ProfessorRestriction,
    Room, RoomId, RoomRestriction, Section, SectionId, TimeSlot, TimeSlotId,
};
use crate::validation::validate_snapshot;

/// Raw repository contents: every entity list plus the link tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotData {
    pub courses: Vec<Course>,
    pub professors: Vec<Professor>,
    pub rooms: Vec<Room>,
    pub time_slots: Vec<TimeSlot>,
    pub sections: Vec<Section>,
    /// Teaching eligibility.
    pub course_professors: Vec<CourseProfessor>,
    /// Room restrictions per course.
    pub room_restrictions: Vec<RoomRestriction>,
    /// Unavailable slots per professor.
    pub professor_restrictions: Vec<ProfessorRestriction>,
}

impl SnapshotData {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds a professor.
    pub fn with_professor(mut self, professor: Professor) -> Self {
        self.professors.push(professor);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a time slot.
    pub fn with_time_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }

    /// Adds a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Marks `professor` eligible to teach `course`.
    pub fn with_eligibility(
        mut self,
        course: impl Into<CourseId>,
        professor: impl Into<ProfessorId>,
    ) -> Self {
        self.course_professors.push(CourseProfessor {
            course_id: course.into(),
            professor_id: professor.into(),
        });
        self
    }

    /// Permits `course` to use `room` (and, once any link exists, only the
    /// linked rooms).
    pub fn with_room_restriction(
        mut self,
        course: impl Into<CourseId>,
        room: impl Into<RoomId>,
    ) -> Self {
        self.room_restrictions.push(RoomRestriction {
            course_id: course.into(),
            room_id: room.into(),
        });
        self
    }

    /// Marks `professor` unavailable during `slot`.
    pub fn with_professor_restriction(
        mut self,
        professor: impl Into<ProfessorId>,
        slot: impl Into<TimeSlotId>,
    ) -> Self {
        self.professor_restrictions.push(ProfessorRestriction {
            professor_id: professor.into(),
            time_slot_id: slot.into(),
        });
        self
    }
}

/// A read-only supplier of repository snapshots.
pub trait SnapshotSource {
    /// Error raised when the repository cannot be read.
    type Error: fmt::Display;

    /// Reads every entity and link in one consistent call.
    fn fetch(&self) -> Result<SnapshotData, Self::Error>;
}

impl SnapshotSource for SnapshotData {
    type Error = Infallible;

    fn fetch(&self) -> Result<SnapshotData, Self::Error> {
        Ok(self.clone())
    }
}

/// Reads a snapshot exported by the repository as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

/// Failure reading a JSON snapshot file.
#[derive(Debug, Error)]
pub enum JsonSourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl JsonFileSource {
    /// Creates a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for JsonFileSource {
    type Error = JsonSourceError;

    fn fetch(&self) -> Result<SnapshotData, Self::Error> {
        let path = self.path.display().to_string();
        let text = std::fs::read_to_string(&self.path).map_err(|source| JsonSourceError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| JsonSourceError::Parse { path, source })
    }
}

/// Rooms a course may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEligibility<'a> {
    /// No restriction links; every room is permitted.
    All,
    /// Only the linked rooms are permitted.
    Only(&'a BTreeSet<RoomId>),
}

impl RoomEligibility<'_> {
    /// Whether `room` is permitted.
    pub fn permits(&self, room: RoomId) -> bool {
        match self {
            RoomEligibility::All => true,
            RoomEligibility::Only(rooms) => rooms.contains(&room),
        }
    }
}

/// Validated, indexed, immutable view of the repository.
#[derive(Debug, Clone)]
pub struct Snapshot {
    courses: BTreeMap<CourseId, Course>,
    professors: BTreeMap<ProfessorId, Professor>,
    rooms: BTreeMap<RoomId, Room>,
    time_slots: BTreeMap<TimeSlotId, TimeSlot>,
    sections: BTreeMap<SectionId, Section>,
    eligible_professors: BTreeMap<CourseId, BTreeSet<ProfessorId>>,
    permitted_rooms: BTreeMap<CourseId, BTreeSet<RoomId>>,
    restricted_slots: BTreeMap<ProfessorId, BTreeSet<TimeSlotId>>,
    slots_by_pattern: BTreeMap<DayPattern, Vec<TimeSlotId>>,
    slot_positions: BTreeMap<TimeSlotId, usize>,
    sections_by_course: BTreeMap<CourseId, Vec<SectionId>>,
}

impl Snapshot {
    /// Reads, validates and indexes one snapshot from `source`.
    pub fn load<S: SnapshotSource>(source: &S) -> EngineResult<Self> {
        let data = source
            .fetch()
            .map_err(|e| EngineError::Source(e.to_string()))?;
        Self::from_data(data)
    }

    /// Validates and indexes already-fetched data.
    pub fn from_data(data: SnapshotData) -> EngineResult<Self> {
        validate_snapshot(&data).map_err(EngineError::DataIntegrity)?;

        let mut slots_by_pattern: BTreeMap<DayPattern, Vec<TimeSlotId>> = BTreeMap::new();
        for ts in &data.time_slots {
            slots_by_pattern.entry(ts.day_pattern).or_default().push(ts.id);
        }
        let mut slot_positions = BTreeMap::new();
        for slots in slots_by_pattern.values_mut() {
            slots.sort();
            for (pos, &id) in slots.iter().enumerate() {
                slot_positions.insert(id, pos);
            }
        }

        let mut eligible_professors: BTreeMap<CourseId, BTreeSet<ProfessorId>> = BTreeMap::new();
        for link in &data.course_professors {
            eligible_professors
                .entry(link.course_id)
                .or_default()
                .insert(link.professor_id);
        }

        let mut permitted_rooms: BTreeMap<CourseId, BTreeSet<RoomId>> = BTreeMap::new();
        for link in &data.room_restrictions {
            permitted_rooms
                .entry(link.course_id)
                .or_default()
                .insert(link.room_id);
        }

        let mut restricted_slots: BTreeMap<ProfessorId, BTreeSet<TimeSlotId>> = BTreeMap::new();
        for link in &data.professor_restrictions {
            restricted_slots
                .entry(link.professor_id)
                .or_default()
                .insert(link.time_slot_id);
        }

        let mut sections_by_course: BTreeMap<CourseId, Vec<SectionId>> = BTreeMap::new();
        for s in &data.sections {
            sections_by_course.entry(s.course_id).or_default().push(s.id);
        }
        for ids in sections_by_course.values_mut() {
            ids.sort();
        }

        let snapshot = Self {
            courses: data.courses.into_iter().map(|c| (c.id, c)).collect(),
            professors: data.professors.into_iter().map(|p| (p.id, p)).collect(),
            rooms: data.rooms.into_iter().map(|r| (r.id, r)).collect(),
            time_slots: data.time_slots.into_iter().map(|t| (t.id, t)).collect(),
            sections: data.sections.into_iter().map(|s| (s.id, s)).collect(),
            eligible_professors,
            permitted_rooms,
            restricted_slots,
            slots_by_pattern,
            slot_positions,
            sections_by_course,
        };

        debug!(
            courses = snapshot.courses.len(),
            professors = snapshot.professors.len(),
            rooms = snapshot.rooms.len(),
            time_slots = snapshot.time_slots.len(),
            sections = snapshot.sections.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(&id)
    }

    pub fn professor(&self, id: ProfessorId) -> Option<&Professor> {
        self.professors.get(&id)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn time_slot(&self, id: TimeSlotId) -> Option<&TimeSlot> {
        self.time_slots.get(&id)
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    /// Courses in id order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Professors in id order.
    pub fn professors(&self) -> impl Iterator<Item = &Professor> {
        self.professors.values()
    }

    /// Rooms in id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Sections in id order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Section ids of a course, ascending.
    pub fn sections_of(&self, course: CourseId) -> &[SectionId] {
        self.sections_by_course
            .get(&course)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Professors eligible to teach `course`, ascending.
    pub fn eligible_professors(&self, course: CourseId) -> impl Iterator<Item = ProfessorId> + '_ {
        self.eligible_professors
            .get(&course)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Whether `professor` may teach `course`.
    pub fn is_eligible(&self, course: CourseId, professor: ProfessorId) -> bool {
        self.eligible_professors
            .get(&course)
            .is_some_and(|set| set.contains(&professor))
    }

    /// Rooms `course` may use.
    pub fn room_eligibility(&self, course: CourseId) -> RoomEligibility<'_> {
        match self.permitted_rooms.get(&course) {
            Some(rooms) => RoomEligibility::Only(rooms),
            None => RoomEligibility::All,
        }
    }

    /// Slots `professor` is unavailable for.
    pub fn restricted_slots(&self, professor: ProfessorId) -> impl Iterator<Item = TimeSlotId> + '_ {
        self.restricted_slots
            .get(&professor)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Whether `professor` is unavailable during `slot`.
    pub fn is_restricted(&self, professor: ProfessorId, slot: TimeSlotId) -> bool {
        self.restricted_slots
            .get(&professor)
            .is_some_and(|set| set.contains(&slot))
    }

    /// Slots of `pattern` in canonical (id) order.
    pub fn pattern_slots(&self, pattern: DayPattern) -> &[TimeSlotId] {
        self.slots_by_pattern
            .get(&pattern)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Zero-based position of `slot` within its pattern.
    pub fn slot_position(&self, slot: TimeSlotId) -> Option<usize> {
        self.slot_positions.get(&slot).copied()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn professor_count(&self) -> usize {
        self.professors.len()
    }
}
