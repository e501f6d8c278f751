//! Typed entity identifiers.
//!
//! Every entity kind gets its own newtype over `u32` so that a room id can
//! never be passed where a professor id is expected. Identifiers serialize
//! as bare numbers, matching the repository's integer primary keys.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the raw numeric identifier.
            #[inline]
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Course`](super::Course).
    CourseId,
    "course"
);
entity_id!(
    /// Identifier of a [`Professor`](super::Professor).
    ProfessorId,
    "professor"
);
entity_id!(
    /// Identifier of a [`Room`](super::Room).
    RoomId,
    "room"
);
entity_id!(
    /// Identifier of a [`TimeSlot`](super::TimeSlot).
    TimeSlotId,
    "slot"
);
entity_id!(
    /// Identifier of a [`Section`](super::Section).
    SectionId,
    "section"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        assert_eq!(CourseId(3).to_string(), "course#3");
        assert_eq!(TimeSlotId(12).to_string(), "slot#12");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&RoomId(7)).unwrap();
        assert_eq!(json, "7");
        let back: RoomId = serde_json::from_str("7").unwrap();
        assert_eq!(back, RoomId(7));
    }

    #[test]
    fn test_ordering_follows_number() {
        assert!(SectionId(1) < SectionId(2));
        assert_eq!(ProfessorId::from(5).get(), 5);
    }
}
