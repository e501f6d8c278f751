//! Course timetabling engine.
//!
//! Assigns every course section to exactly one (professor, room,
//! contiguous time-slot block) triple for a term, satisfying hard
//! feasibility rules and minimizing a weighted sum of soft penalties.
//!
//! # Pipeline
//!
//! 1. **`snapshot`**: read and validate the repository contents
//! 2. **`domain`**: enumerate statically feasible candidates per section
//! 3. **`timetable`**: hard constraints, objective, incumbent, decoding
//! 4. **`solver`**: solver seam and the `good_lp` MIP backend
//! 5. **`engine`**: run the pipeline and classify the outcome
//!
//! Supporting modules: `models` (domain types), `validation` (integrity
//! checks), `audit` (hard-constraint checker for produced schedules),
//! `kpi` (metrics recomputed from records), `config`, `error`, and `http`
//! (axum binding).
//!
//! # Example
//!
//! ```
//! use u_timetable::config::EngineConfig;
//! use u_timetable::engine::{generate_from_source, GenerateResult};
//! use u_timetable::models::{Course, DayPattern, Professor, Room, Section, TimeSlot};
//! use u_timetable::snapshot::SnapshotData;
//!
//! let data = SnapshotData::new()
//!     .with_course(Course::new(1, "Math 101", 3, DayPattern::Mwf).with_max_students(25))
//!     .with_professor(Professor::new(1, "Dr. Smith", 12))
//!     .with_room(Room::new(1, "Hall A", 30))
//!     .with_time_slot(TimeSlot::new(1, "11AM", DayPattern::Mwf))
//!     .with_section(Section::new(1, 1, 1))
//!     .with_eligibility(1, 1);
//!
//! let result = generate_from_source(&data, &EngineConfig::default());
//! assert!(matches!(result, GenerateResult::Ok { ref schedule, .. } if schedule.len() == 1));
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod audit;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http;
pub mod kpi;
pub mod models;
pub mod snapshot;
pub mod solver;
pub mod timetable;
pub mod validation;
