//! Timetable quality metrics (KPIs).
//!
//! Recomputes the objective components and a few descriptive indicators
//! directly from schedule records.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Time penalty | Sum of start-slot penalties |
//! | Consecutive penalty | Back-to-back slot pairs per professor |
//! | Workload balance | Max − min credit hours over all professors |
//! | Avg load | Mean credit hours per professor |
//! | Room utilization | Occupied slots / available slots, per room |
//!
//! # Reference
//! Burke & Petrovic (2002), "Recent research directions in automated timetabling"

use std::collections::BTreeMap;

use crate::timetable::triangular;
use crate::models::{DayPattern, ProfessorId, RoomId, Schedule, ScheduleMetrics};
use crate::snapshot::Snapshot;
use crate::timetable::{ConsecutivePenalty, ObjectiveConfig};

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Objective components recomputed from the records.
    pub metrics: ScheduleMetrics,
    /// Credit hours per professor (every professor, zero included).
    pub professor_loads: BTreeMap<ProfessorId, u32>,
    /// Mean credit hours per professor.
    pub avg_load: f64,
    /// Per-room utilization (0.0..1.0).
    pub room_utilization: BTreeMap<RoomId, f64>,
    /// Mean room utilization (0.0..1.0).
    pub avg_room_utilization: f64,
}

impl TimetableKpi {
    /// Computes KPIs for `schedule` under the given objective settings.
    pub fn calculate(snapshot: &Snapshot, schedule: &Schedule, objective: &ObjectiveConfig) -> Self {
        let mut professor_loads: BTreeMap<ProfessorId, u32> =
            snapshot.professors().map(|p| (p.id, 0)).collect();
        let mut room_slots: BTreeMap<RoomId, usize> = snapshot.rooms().map(|r| (r.id, 0)).collect();
        let mut time_penalty = 0;

        for r in &schedule.records {
            *professor_loads.entry(r.professor_id).or_insert(0) += r.credit_hours;
            *room_slots.entry(r.room_id).or_insert(0) += r.slot_ids.len();
            if let (Some(&start), Some(label)) = (r.slot_ids.first(), r.slot_labels.first()) {
                let position = snapshot.slot_position(start).unwrap_or(usize::MAX);
                time_penalty += objective.time_penalties.penalty(position, label);
            }
        }

        // Back-to-back pairs per professor
        let mut pairs: BTreeMap<ProfessorId, i64> = BTreeMap::new();
        for professor in snapshot.professors() {
            let taught = schedule.records_for_professor(professor.id);
            let busy = |slot| taught.iter().filter(|r| r.occupies(slot)).count() as i64;
            let mut n = 0;
            for pattern in DayPattern::ALL {
                for pair in snapshot.pattern_slots(pattern).windows(2) {
                    n += (busy(pair[0]) + busy(pair[1]) - 1).max(0);
                }
            }
            pairs.insert(professor.id, n);
        }
        let consecutive_penalty = match objective.consecutive {
            ConsecutivePenalty::PairCount => pairs.values().sum(),
            ConsecutivePenalty::Triangular => pairs.values().map(|&n| triangular(n)).sum(),
        };

        let workload_balance = match (professor_loads.values().max(), professor_loads.values().min()) {
            (Some(&hi), Some(&lo)) => i64::from(hi) - i64::from(lo),
            _ => 0,
        };

        let avg_load = if professor_loads.is_empty() {
            0.0
        } else {
            professor_loads.values().map(|&h| f64::from(h)).sum::<f64>() / professor_loads.len() as f64
        };

        let total_slots: usize = DayPattern::ALL
            .iter()
            .map(|&p| snapshot.pattern_slots(p).len())
            .sum();
        let room_utilization: BTreeMap<RoomId, f64> = room_slots
            .into_iter()
            .map(|(room, used)| {
                let u = if total_slots == 0 {
                    0.0
                } else {
                    used as f64 / total_slots as f64
                };
                (room, u)
            })
            .collect();
        let avg_room_utilization = if room_utilization.is_empty() {
            0.0
        } else {
            room_utilization.values().sum::<f64>() / room_utilization.len() as f64
        };

        Self {
            metrics: ScheduleMetrics {
                time_penalty,
                consecutive_penalty,
                workload_balance,
            },
            professor_loads,
            avg_load,
            room_utilization,
            avg_room_utilization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Course, CourseId, Professor, Room, ScheduleRecord, Section, SectionId, TimeSlot, TimeSlotId,
    };
    use crate::snapshot::SnapshotData;

    fn snapshot() -> Snapshot {
        Snapshot::from_data(
            SnapshotData::new()
                .with_course(Course::new(1, "Math", 3, DayPattern::Mwf).with_max_students(10))
                .with_professor(Professor::new(1, "Dr. A", 12))
                .with_professor(Professor::new(2, "Dr. B", 12))
                .with_room(Room::new(1, "R1", 20))
                .with_room(Room::new(2, "R2", 20))
                .with_time_slot(TimeSlot::new(1, "8AM", DayPattern::Mwf))
                .with_time_slot(TimeSlot::new(2, "9:30AM", DayPattern::Mwf))
                .with_time_slot(TimeSlot::new(3, "11AM", DayPattern::Mwf))
                .with_time_slot(TimeSlot::new(4, "12:30PM", DayPattern::Mwf))
                .with_section(Section::new(1, 1, 1))
                .with_section(Section::new(2, 1, 2))
                .with_section(Section::new(3, 1, 3))
                .with_eligibility(1, 1)
                .with_eligibility(1, 2),
        )
        .unwrap()
    }

    fn record(section: u32, prof: u32, room: u32, slot: u32, label: &str) -> ScheduleRecord {
        ScheduleRecord {
            section_id: SectionId(section),
            section_number: section,
            course_id: CourseId(1),
            course_name: "Math".into(),
            credit_hours: 3,
            professor_id: ProfessorId(prof),
            professor_name: format!("P{prof}"),
            room_id: RoomId(room),
            room_name: format!("R{room}"),
            day_pattern: DayPattern::Mwf,
            start_time: label.into(),
            slot_ids: vec![TimeSlotId(slot)],
            slot_labels: vec![label.into()],
        }
    }

    fn schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_record(record(1, 1, 1, 1, "8AM"));
        s.add_record(record(2, 1, 1, 2, "9:30AM"));
        s.add_record(record(3, 1, 2, 3, "11AM"));
        s
    }

    #[test]
    fn test_kpi_pair_count() {
        let kpi = TimetableKpi::calculate(&snapshot(), &schedule(), &ObjectiveConfig::default());
        assert_eq!(kpi.metrics.time_penalty, 5);
        assert_eq!(kpi.metrics.consecutive_penalty, 2);
        assert_eq!(kpi.metrics.workload_balance, 9);
        assert_eq!(kpi.professor_loads[&ProfessorId(2)], 0);
        assert!((kpi.avg_load - 4.5).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_triangular() {
        let objective = ObjectiveConfig {
            consecutive: ConsecutivePenalty::Triangular,
            ..ObjectiveConfig::default()
        };
        let kpi = TimetableKpi::calculate(&snapshot(), &schedule(), &objective);
        assert_eq!(kpi.metrics.consecutive_penalty, 3);
    }

    #[test]
    fn test_kpi_utilization() {
        let kpi = TimetableKpi::calculate(&snapshot(), &schedule(), &ObjectiveConfig::default());
        // R1: 2/4, R2: 1/4
        assert!((kpi.room_utilization[&RoomId(1)] - 0.5).abs() < 1e-10);
        assert!((kpi.room_utilization[&RoomId(2)] - 0.25).abs() < 1e-10);
        assert!((kpi.avg_room_utilization - 0.375).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = TimetableKpi::calculate(&snapshot(), &Schedule::new(), &ObjectiveConfig::default());
        assert_eq!(kpi.metrics, ScheduleMetrics::default());
        assert!((kpi.avg_room_utilization - 0.0).abs() < 1e-10);
    }
}
