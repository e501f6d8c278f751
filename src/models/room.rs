//! Room model.
//!
//! Rooms are the spatial resource: each hosts at most one section per slot
//! and seats a fixed number of students.

use serde::{Deserialize, Serialize};

use super::RoomId;

/// A room that can host sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Display name.
    #[serde(alias = "room_name")]
    pub name: String,
    /// Seats available.
    pub capacity: u32,
}

impl Room {
    /// Creates a new room.
    pub fn new(id: impl Into<RoomId>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
        }
    }

    /// Whether the room seats `students`.
    #[inline]
    pub fn seats(&self, students: u32) -> bool {
        students <= self.capacity
    }
}
