//! Timetable formulation: hard constraints, objective, incumbent and decoding.

mod assemble;
mod builder;
mod construct;
mod objective;

pub use assemble::assemble_schedule;
pub(crate) use builder::Formulation;
pub use builder::{ModelError, TimetableMipBuilder, TimetableModel};
pub use construct::construct_incumbent;
pub(crate) use objective::triangular;
pub use objective::{ConsecutivePenalty, ObjectiveConfig, ObjectiveTerms, ObjectiveWeights, TimePenaltyTable};
