//! Timetabling domain models.
//!
//! Provides the entity types supplied by the repository (courses,
//! professors, rooms, time slots, sections) and the schedule types the
//! engine produces.
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling | Role |
//! |-------------|--------------------|------|
//! | Section | Task | Unit that receives exactly one assignment |
//! | Professor | Human resource | Exclusive per slot, capped workload |
//! | Room | Primary resource | Exclusive per slot, capacity filter |
//! | TimeSlot | Time bucket | Ordered within a day pattern |
//! | ScheduleRecord | Assignment | Resolved (professor, room, block) |

mod course;
mod ids;
mod links;
mod professor;
mod room;
mod schedule;
mod time_slot;

pub use course::{Course, DayPattern, Section};
pub use ids::{CourseId, ProfessorId, RoomId, SectionId, TimeSlotId};
pub use links::{CourseProfessor, ProfessorRestriction, RoomRestriction};
pub use professor::Professor;
pub use room::Room;
pub use schedule::{Schedule, ScheduleMetrics, ScheduleRecord, Violation, ViolationType};
pub use time_slot::TimeSlot;
