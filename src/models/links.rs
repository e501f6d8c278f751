//! Relationship links between entities.
//!
//! Each link is one row of a many-to-many table in the repository.

use serde::{Deserialize, Serialize};

use super::{CourseId, ProfessorId, RoomId, TimeSlotId};

/// Professor may teach course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CourseProfessor {
    pub course_id: CourseId,
    pub professor_id: ProfessorId,
}

/// Course may only be hosted in the linked rooms.
///
/// A course with no links at all may use every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomRestriction {
    pub course_id: CourseId,
    pub room_id: RoomId,
}

/// Professor is unavailable during the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfessorRestriction {
    pub professor_id: ProfessorId,
    pub time_slot_id: TimeSlotId,
}
