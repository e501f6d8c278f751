//! Course and section models.
//!
//! A course carries everything the engine needs to place its sections:
//! credit hours (workload), meeting-day pattern, enrollment cap (room fit)
//! and the number of contiguous slots one meeting occupies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{CourseId, SectionId};

/// Weekly meeting pattern shared by courses and time slots.
///
/// Declaration order is the canonical ordering used when sorting schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayPattern {
    /// Monday / Wednesday / Friday.
    #[serde(rename = "MWF")]
    Mwf,
    /// Tuesday / Thursday.
    #[serde(rename = "TTh")]
    TTh,
}

impl DayPattern {
    /// All patterns in canonical order.
    pub const ALL: [DayPattern; 2] = [DayPattern::Mwf, DayPattern::TTh];

    /// Wire label (`"MWF"` or `"TTh"`).
    pub fn as_str(self) -> &'static str {
        match self {
            DayPattern::Mwf => "MWF",
            DayPattern::TTh => "TTh",
        }
    }
}

impl fmt::Display for DayPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MWF" => Ok(DayPattern::Mwf),
            "TTh" => Ok(DayPattern::TTh),
            other => Err(format!("unknown day pattern '{other}'")),
        }
    }
}

/// A course offered this term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Display name (e.g. "CS 101").
    pub name: String,
    /// Credit hours counted against a professor's workload.
    pub credit_hours: u32,
    /// Meeting pattern; sections may only use slots of this pattern.
    #[serde(alias = "meeting_days")]
    pub day_pattern: DayPattern,
    /// Enrollment cap. The hosting room must seat at least this many.
    pub max_students: u32,
    /// Contiguous slots one meeting occupies.
    #[serde(default = "default_slots_needed")]
    pub slots_needed: u32,
}

fn default_slots_needed() -> u32 {
    1
}

impl Course {
    /// Creates a single-slot course.
    pub fn new(
        id: impl Into<CourseId>,
        name: impl Into<String>,
        credit_hours: u32,
        day_pattern: DayPattern,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            credit_hours,
            day_pattern,
            max_students: 1,
            slots_needed: 1,
        }
    }

    /// Sets the enrollment cap.
    pub fn with_max_students(mut self, max_students: u32) -> Self {
        self.max_students = max_students;
        self
    }

    /// Sets the number of contiguous slots per meeting.
    pub fn with_slots_needed(mut self, slots_needed: u32) -> Self {
        self.slots_needed = slots_needed;
        self
    }
}

/// One section of a course; the unit that receives an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: SectionId,
    /// Owning course.
    pub course_id: CourseId,
    /// Section number, unique within its course.
    pub section_number: u32,
}

impl Section {
    /// Creates a new section.
    pub fn new(id: impl Into<SectionId>, course_id: impl Into<CourseId>, section_number: u32) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            section_number,
        }
    }
}
