//! Professor model.
//!
//! Teaching eligibility and unavailable slots are relationships owned by
//! the snapshot, not by the professor record itself.

use serde::{Deserialize, Serialize};

use super::ProfessorId;

/// A professor who can be assigned sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    /// Unique professor identifier.
    pub id: ProfessorId,
    /// Display name.
    pub name: String,
    /// Upper bound on assigned credit hours for the term.
    pub max_credit_hours: u32,
}

impl Professor {
    /// Creates a new professor.
    pub fn new(id: impl Into<ProfessorId>, name: impl Into<String>, max_credit_hours: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_credit_hours,
        }
    }
}
