//! Solution decoding.

use crate::domain::{CandidateDomain, CandidateIndex};
use crate::error::{EngineError, EngineResult};
use crate::models::{Schedule, ScheduleRecord};
use crate::snapshot::Snapshot;

/// Decodes selected candidates into canonically ordered records.
pub fn assemble_schedule(
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    selected: &[CandidateIndex],
) -> EngineResult<Schedule> {
    let mut schedule = Schedule::new();
    for &idx in selected {
        schedule.add_record(decode_record(snapshot, domain, idx)?);
    }
    schedule.sort_canonical();
    Ok(schedule)
}

fn decode_record(
    snapshot: &Snapshot,
    domain: &CandidateDomain,
    idx: CandidateIndex,
) -> EngineResult<ScheduleRecord> {
    let cand = domain.get(idx);
    let key = cand.key;
    let missing = |what: String| EngineError::Backend(format!("selected candidate references unknown {what}"));

    let section = snapshot
        .section(key.section)
        .ok_or_else(|| missing(key.section.to_string()))?;
    let course = snapshot
        .course(cand.course)
        .ok_or_else(|| missing(cand.course.to_string()))?;
    let professor = snapshot
        .professor(key.professor)
        .ok_or_else(|| missing(key.professor.to_string()))?;
    let room = snapshot
        .room(key.room)
        .ok_or_else(|| missing(key.room.to_string()))?;

    let block = domain.block_of(cand);
    let slot_labels = block
        .slots
        .iter()
        .map(|&id| {
            snapshot
                .time_slot(id)
                .map(|ts| ts.label.clone())
                .ok_or_else(|| missing(id.to_string()))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(ScheduleRecord {
        section_id: section.id,
        section_number: section.section_number,
        course_id: course.id,
        course_name: course.name.clone(),
        credit_hours: course.credit_hours,
        professor_id: professor.id,
        professor_name: professor.name.clone(),
        room_id: room.id,
        room_name: room.name.clone(),
        day_pattern: block.day_pattern,
        start_time: slot_labels.first().cloned().unwrap_or_default(),
        slot_ids: block.slots.clone(),
        slot_labels,
    })
}
