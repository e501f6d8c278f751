//! Time slot model.
//!
//! Slots sharing a day pattern form a totally ordered sequence. The
//! canonical order is the slot id: a lower id is earlier in the day.

use serde::{Deserialize, Serialize};

use super::{DayPattern, TimeSlotId};

/// A teaching period within a weekly day pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier; also the chronological key within a pattern.
    pub id: TimeSlotId,
    /// Display label (e.g. "9:30AM").
    #[serde(alias = "time")]
    pub label: String,
    /// Pattern this slot belongs to.
    #[serde(alias = "meeting_days")]
    pub day_pattern: DayPattern,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub fn new(id: impl Into<TimeSlotId>, label: impl Into<String>, day_pattern: DayPattern) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            day_pattern,
        }
    }
}
